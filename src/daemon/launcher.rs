//! Detached daemon process launcher.
//!
//! Starting `relintd` is a fire-and-forget operation: the child is fully
//! detached from the client's terminal session, its standard streams are
//! redirected to the null device in optimized builds, and the handle is
//! dropped as soon as the spawn succeeds. The client never waits on the
//! daemon; it only polls the channel until the daemon binds it (see
//! [`crate::daemon::auto_start`]).

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{RelintError, Result};

/// Name of the daemon program started by the client.
#[cfg(unix)]
pub const DAEMON_PROGRAM: &str = "relintd";

#[cfg(windows)]
pub const DAEMON_PROGRAM: &str = "relintd.exe";

/// Spawn the daemon as a detached background process.
///
/// The daemon program is resolved relative to the client's own install
/// location. Optimized builds append `--silent` so the daemon logs to its
/// own file instead of the (nulled) console streams.
///
/// # Errors
///
/// Returns `DaemonSpawn` if the daemon program is not found next to the
/// client or if process creation fails at the OS level. There is no retry
/// here; retries belong to the connector.
pub fn spawn_daemon() -> Result<()> {
    let current_exe = std::env::current_exe()?;
    let program = daemon_program_for(&current_exe);

    if !program.exists() {
        return Err(RelintError::DaemonSpawn(format!(
            "daemon program not found at {:?}",
            program
        )));
    }

    let args: &[&str] = if cfg!(debug_assertions) {
        &[]
    } else {
        &["--silent"]
    };

    tracing::debug!("spawning daemon: {:?} {:?}", program, args);
    spawn_detached(&program, args)
}

/// Resolve the daemon program path from the client executable's location.
///
/// Two layouts are recognized:
/// - development: the client runs out of a cargo build tree (a `target`
///   path component); the daemon launcher lives at `<workspace>/bin/`.
/// - installed: the daemon sits next to the client binary.
pub fn daemon_program_for(client_exe: &Path) -> PathBuf {
    if let Some(workspace) = build_tree_root(client_exe) {
        workspace.join("bin").join(DAEMON_PROGRAM)
    } else {
        client_exe.with_file_name(DAEMON_PROGRAM)
    }
}

/// Find the directory containing the cargo `target` build-output marker,
/// if the executable runs out of a build tree.
fn build_tree_root(exe: &Path) -> Option<&Path> {
    exe.ancestors()
        .find(|dir| dir.file_name().is_some_and(|name| name == "target"))
        .and_then(Path::parent)
}

/// Start `program` detached from this process (Unix).
///
/// The child gets a new session (no controlling terminal), the parent's
/// environment, and null standard streams in optimized builds. The parent
/// returns without waiting; the `Child` handle is dropped immediately.
#[cfg(unix)]
fn spawn_detached(program: &Path, args: &[&str]) -> Result<()> {
    use std::os::unix::process::CommandExt;
    use std::process::Stdio;

    let mut command = Command::new(program);
    command.args(args);

    // Debug builds keep the client's streams attached so daemon startup
    // problems stay visible.
    #[cfg(not(debug_assertions))]
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // Detach from the controlling terminal. setsid can only fail if the
    // child is already a group leader, which it never is after fork.
    unsafe {
        command.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }

    command
        .spawn()
        .map_err(|e| RelintError::DaemonSpawn(format!("{}: {}", program.display(), e)))?;

    Ok(())
}

/// Start `program` detached from this process (Windows).
///
/// Creates the daemon as a new process group disconnected from this
/// console, with standard handles pointing at the null device in optimized
/// builds. The launcher releases the process handle right after creation.
#[cfg(windows)]
fn spawn_detached(program: &Path, args: &[&str]) -> Result<()> {
    use std::os::windows::process::CommandExt;
    use std::process::Stdio;

    const DETACHED_PROCESS: u32 = 0x00000008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
    const CREATE_NO_WINDOW: u32 = 0x08000000;

    let mut command = Command::new(program);
    command.args(args);
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);

    #[cfg(not(debug_assertions))]
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    command
        .spawn()
        .map_err(|e| RelintError::DaemonSpawn(format!("{}: {}", program.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_build_tree_layout_resolves_workspace_bin() {
        let exe = Path::new("/home/dev/relint/target/debug/relint");
        assert_eq!(
            daemon_program_for(exe),
            Path::new("/home/dev/relint/bin/relintd")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_build_tree_layout_resolves_release_profile() {
        let exe = Path::new("/home/dev/relint/target/release/relint");
        assert_eq!(
            daemon_program_for(exe),
            Path::new("/home/dev/relint/bin/relintd")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_installed_layout_resolves_sibling() {
        let exe = Path::new("/usr/local/bin/relint");
        assert_eq!(
            daemon_program_for(exe),
            Path::new("/usr/local/bin/relintd")
        );
    }

    #[test]
    fn test_spawn_daemon_program_not_found() {
        // The daemon program is not installed in the test environment, so
        // resolution succeeds but the existence check fails.
        let err = spawn_daemon().unwrap_err();
        assert!(matches!(err, RelintError::DaemonSpawn(_)));
    }
}
