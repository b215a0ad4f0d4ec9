//! Client connection to the daemon channel.
//!
//! On Unix the channel is a Unix domain socket; on Windows it is a named
//! pipe. `connect` returns raw `io::Error`s so the connector can classify
//! endpoint-absent failures without losing the error kind.

use std::io;

#[cfg(unix)]
use std::path::Path;

#[cfg(unix)]
use tokio::net::UnixStream;

#[cfg(windows)]
use tokio::net::windows::named_pipe::NamedPipeClient;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::arena::{IO_CHUNK_SIZE, SessionArena};
use crate::daemon::address;
use crate::daemon::protocol;
use crate::error::Result;

/// One open connection to the daemon.
///
/// A client performs exactly one request/response exchange and is then
/// done; the connection is closed when the exchange completes or the
/// client is dropped on an error path.
#[cfg(unix)]
#[derive(Debug)]
pub struct DaemonClient {
    stream: UnixStream,
}

#[cfg(windows)]
#[derive(Debug)]
pub struct DaemonClient {
    pipe: NamedPipeClient,
}

#[cfg(unix)]
impl DaemonClient {
    /// Connect to the daemon at the well-known socket address.
    pub async fn connect() -> io::Result<Self> {
        Self::connect_to(&address::socket_path()).await
    }

    /// Connect to the daemon at an explicit socket path.
    ///
    /// This is the seam used by tests to stand up a daemon on a private
    /// socket instead of the global one.
    pub async fn connect_to(path: &Path) -> io::Result<Self> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self { stream })
    }

    /// Perform the invocation's single request/response exchange.
    ///
    /// Writes the rendered header, streams `payload` into the channel,
    /// then relays the response frame into `sink`. The reusable chunk
    /// buffer is drawn from the session arena. Returns the number of
    /// response bytes relayed.
    pub async fn relay<R, W>(
        &mut self,
        header: &[u8],
        payload: &mut R,
        sink: &mut W,
        arena: &mut SessionArena,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut chunk = arena.alloc(IO_CHUNK_SIZE)?;

        protocol::write_request(&mut self.stream, header, payload, &mut chunk).await?;
        let relayed = protocol::read_response(&mut self.stream, sink, &mut chunk).await?;

        self.stream.shutdown().await?;
        Ok(relayed)
    }
}

#[cfg(windows)]
impl DaemonClient {
    /// Connect to the daemon's named pipe.
    ///
    /// `ERROR_PIPE_BUSY` means the daemon is alive but every pipe instance
    /// is in use; the open is retried after a short delay rather than
    /// treated as endpoint-absent (which would double-spawn the daemon).
    pub async fn connect() -> io::Result<Self> {
        use std::time::Duration;
        use tokio::net::windows::named_pipe::ClientOptions;
        use windows_sys::Win32::Foundation::ERROR_PIPE_BUSY;

        let pipe_name = address::pipe_name();

        let pipe = loop {
            match ClientOptions::new().open(&pipe_name) {
                Ok(pipe) => break pipe,
                Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY as i32) => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(Self { pipe })
    }

    /// Perform the invocation's single request/response exchange.
    pub async fn relay<R, W>(
        &mut self,
        header: &[u8],
        payload: &mut R,
        sink: &mut W,
        arena: &mut SessionArena,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut chunk = arena.alloc(IO_CHUNK_SIZE)?;

        protocol::write_request(&mut self.pipe, header, payload, &mut chunk).await?;
        let relayed = protocol::read_response(&mut self.pipe, sink, &mut chunk).await?;

        self.pipe.shutdown().await?;
        Ok(relayed)
    }
}
