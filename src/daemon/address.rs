//! Channel address resolution.
//!
//! The daemon listens on a well-known endpoint derived from a fixed name:
//! a Unix domain socket under the temp directory on POSIX, a named pipe in
//! the reserved pipe namespace on Windows. Resolution is deterministic and
//! side-effect-free; both client and daemon derive the same address
//! independently.

#[cfg(unix)]
use std::path::{Path, PathBuf};

/// Fixed socket file name on POSIX systems.
#[cfg(unix)]
pub const SOCKET_NAME: &str = "relintd.sock";

/// Get the daemon socket path (`$TMPDIR/relintd.sock`, or
/// `/tmp/relintd.sock` when `TMPDIR` is unset).
#[cfg(unix)]
pub fn socket_path() -> PathBuf {
    let base = std::env::var_os("TMPDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    socket_path_in(&base)
}

/// Join the fixed socket name onto an explicit base directory.
#[cfg(unix)]
pub fn socket_path_in(base: &Path) -> PathBuf {
    base.join(SOCKET_NAME)
}

/// Get the daemon pipe name (Windows).
///
/// Returns a named pipe path in the reserved `\\.\pipe\` namespace using
/// the same fixed daemon name as the POSIX socket.
#[cfg(windows)]
pub fn pipe_name() -> String {
    r"\\.\pipe\relintd".to_string()
}
