use thiserror::Error;

/// Exit codes surfaced by the `relint` binary.
///
/// Usage errors exit with clap's own code (2) before a session starts.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const INTERNAL: i32 = 1;
    pub const USER_ERROR: i32 = 2;
    pub const RESOURCE_EXHAUSTED: i32 = 3;
}

#[derive(Error, Debug)]
pub enum RelintError {
    #[error("Failed to start daemon: {0}")]
    DaemonSpawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session memory exhausted: needed {needed} bytes, {remaining} of {capacity} left")]
    ArenaExhausted {
        needed: usize,
        remaining: usize,
        capacity: usize,
    },
}

impl RelintError {
    pub fn exit_code(&self) -> i32 {
        match self {
            // Kept apart from IO failures so a too-small session budget is
            // never mistaken for a broken channel.
            RelintError::ArenaExhausted { .. } => exit_codes::RESOURCE_EXHAUSTED,

            RelintError::DaemonSpawn(_) | RelintError::Io(_) => exit_codes::INTERNAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelintError>;
