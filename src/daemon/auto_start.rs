//! Connect-or-spawn logic for the daemon.
//!
//! The client first tries a direct connection. A failure classified as
//! endpoint-absent means no daemon is listening, so one is spawned and the
//! connection is retried until the new daemon binds its endpoint. Any
//! other failure is propagated unchanged; masking an unrelated I/O error
//! as "daemon absent" would spawn daemons on top of a broken channel.

use std::io;
use std::time::Duration;

use crate::daemon::client::DaemonClient;
use crate::daemon::launcher;
use crate::error::Result;

#[cfg(unix)]
use std::path::Path;

#[cfg(unix)]
use crate::daemon::address;

/// Pause between connection attempts while waiting for a freshly spawned
/// daemon to bind. Only slept in debug builds; the daemon is expected to
/// bind promptly and release builds retry back-to-back.
pub const READY_POLL_DELAY: Duration = Duration::from_millis(30);

/// Ensure the daemon is running and return a connection to it.
///
/// Tries a direct connection first; if the endpoint is absent, spawns the
/// daemon and waits for it to become reachable. The spawned daemon is
/// detached and never awaited; ownership ends at the spawn.
///
/// # Errors
///
/// Returns `DaemonSpawn` if the daemon cannot be started, or the
/// underlying I/O error for any connection failure that is not
/// endpoint-absent.
pub async fn ensure_daemon() -> Result<DaemonClient> {
    match DaemonClient::connect().await {
        Ok(client) => return Ok(client),
        Err(e) if is_endpoint_absent(&e) => {
            tracing::debug!("daemon not running ({}), spawning", e);
        }
        Err(e) => return Err(e.into()),
    }

    launcher::spawn_daemon()?;

    #[cfg(unix)]
    {
        wait_ready(&address::socket_path()).await
    }
    #[cfg(windows)]
    {
        wait_ready().await
    }
}

/// Classify a connection failure as "no daemon is listening".
///
/// `ConnectionRefused` covers a stale socket file with no listener behind
/// it; `NotFound` covers a missing socket file or pipe. Everything else
/// (permissions, resets, ...) is a real error and must not trigger a
/// spawn.
pub fn is_endpoint_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
    )
}

/// Poll the channel until the daemon accepts a connection (Unix).
///
/// The loop closes the race between process creation and socket bind and
/// is unbounded in attempt count: it ends only on success, on a
/// non-recoverable error, or when the user interrupts the client.
#[cfg(unix)]
pub async fn wait_ready(path: &Path) -> Result<DaemonClient> {
    let mut attempts = 0u32;
    loop {
        match DaemonClient::connect_to(path).await {
            Ok(client) => {
                tracing::debug!("daemon ready after {} attempts", attempts);
                return Ok(client);
            }
            Err(e) if is_endpoint_absent(&e) => {
                attempts += 1;
                tracing::trace!("daemon not ready (attempt {}): {}", attempts, e);
                #[cfg(debug_assertions)]
                tokio::time::sleep(READY_POLL_DELAY).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Poll the channel until the daemon accepts a connection (Windows).
#[cfg(windows)]
pub async fn wait_ready() -> Result<DaemonClient> {
    let mut attempts = 0u32;
    loop {
        match DaemonClient::connect().await {
            Ok(client) => {
                tracing::debug!("daemon ready after {} attempts", attempts);
                return Ok(client);
            }
            Err(e) if is_endpoint_absent(&e) => {
                attempts += 1;
                tracing::trace!("daemon not ready (attempt {}): {}", attempts, e);
                #[cfg(debug_assertions)]
                tokio::time::sleep(READY_POLL_DELAY).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refused_and_not_found_are_absent() {
        assert!(is_endpoint_absent(&io::Error::from(
            io::ErrorKind::ConnectionRefused
        )));
        assert!(is_endpoint_absent(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[test]
    fn test_other_errors_are_not_absent() {
        assert!(!is_endpoint_absent(&io::Error::from(
            io::ErrorKind::PermissionDenied
        )));
        assert!(!is_endpoint_absent(&io::Error::from(
            io::ErrorKind::ConnectionReset
        )));
        assert!(!is_endpoint_absent(&io::Error::from(io::ErrorKind::TimedOut)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_socket_classified_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = DaemonClient::connect_to(&tmp.path().join("missing.sock"))
            .await
            .unwrap_err();
        assert!(is_endpoint_absent(&err));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_socket_classified_absent() {
        // A socket file left behind by a dead daemon refuses connections.
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("stale.sock");
        let listener = std::os::unix::net::UnixListener::bind(&path).unwrap();
        drop(listener);

        let err = DaemonClient::connect_to(&path).await.unwrap_err();
        assert!(is_endpoint_absent(&err));
    }
}
