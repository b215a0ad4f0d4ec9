//! Wire protocol codec for daemon communication.
//!
//! This module defines the request/response framing used between the client
//! and `relintd` over the channel.
//!
//! ## Protocol Format
//!
//! The request is a text header followed by a raw payload:
//! - one `cwd=<absolute path>` line
//! - one `<option>=<value>` line per recognized option, in fixed order
//!   (booleans render as `1`/`0`, unset optionals as empty values)
//! - one blank line
//! - the payload bytes, verbatim
//! - a single `0x00` end-of-request byte
//!
//! The response is an undelimited byte stream terminated by `0x00` (which
//! is stripped) or end-of-stream. There are no length prefixes and no
//! multiplexing: exactly one request/response pair occurs per connection.

use std::io;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::arena::{BoundedBuf, SessionArena};
use crate::cli::Cli;
use crate::error::Result;

/// Byte marking the end of the request payload and of the response body.
pub const FRAME_END: u8 = 0;

/// Upper bound reserved for the rendered request header.
pub const REQUEST_HEADER_CAPACITY: usize = 4 * 1024;

/// The recognized options of one lint request.
///
/// Field order here is the wire order; `render` emits exactly one line per
/// field. The version flag is handled entirely by the CLI layer and is
/// never serialized.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub config: Option<String>,
    pub stdin: bool,
    pub stdin_filename: Option<String>,
    pub fix: bool,
    pub fix_dry_run: bool,
    pub fix_to_stdout: bool,
    pub format: String,
    pub ignore_path: Option<String>,
    pub ignore_pattern: Option<String>,
    pub no_ignore: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            config: None,
            stdin: false,
            stdin_filename: None,
            fix: false,
            fix_dry_run: false,
            fix_to_stdout: false,
            format: "stylish".to_string(),
            ignore_path: None,
            ignore_pattern: None,
            no_ignore: false,
        }
    }
}

impl RequestOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli
                .config
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            stdin: cli.stdin,
            stdin_filename: cli.stdin_filename.clone(),
            fix: cli.fix,
            fix_dry_run: cli.fix_dry_run,
            fix_to_stdout: cli.fix_to_stdout,
            format: cli.format.clone(),
            ignore_path: cli
                .ignore_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            ignore_pattern: cli.ignore_pattern.clone(),
            no_ignore: cli.no_ignore,
        }
    }

    /// Render the request header into an arena-backed buffer.
    ///
    /// The header is built in full before the first byte goes on the wire;
    /// a header that does not fit the session budget fails here with
    /// `ArenaExhausted` and nothing is ever sent.
    pub fn render(&self, cwd: &Path, arena: &mut SessionArena) -> Result<BoundedBuf> {
        let mut buf = arena.alloc_buf(REQUEST_HEADER_CAPACITY)?;

        push_line(&mut buf, "cwd", cwd.as_os_str().as_encoded_bytes())?;
        push_line(&mut buf, "config", opt_bytes(&self.config))?;
        push_line(&mut buf, "stdin", bool_bytes(self.stdin))?;
        push_line(&mut buf, "stdin-filename", opt_bytes(&self.stdin_filename))?;
        push_line(&mut buf, "fix", bool_bytes(self.fix))?;
        push_line(&mut buf, "fix-dry-run", bool_bytes(self.fix_dry_run))?;
        push_line(&mut buf, "fix-to-stdout", bool_bytes(self.fix_to_stdout))?;
        push_line(&mut buf, "format", self.format.as_bytes())?;
        push_line(&mut buf, "ignore-path", opt_bytes(&self.ignore_path))?;
        push_line(&mut buf, "ignore-pattern", opt_bytes(&self.ignore_pattern))?;
        push_line(&mut buf, "no-ignore", bool_bytes(self.no_ignore))?;
        buf.push_slice(b"\n")?;

        Ok(buf)
    }
}

fn push_line(buf: &mut BoundedBuf, key: &str, value: &[u8]) -> Result<()> {
    buf.push_slice(key.as_bytes())?;
    buf.push_slice(b"=")?;
    buf.push_slice(value)?;
    buf.push_slice(b"\n")
}

fn bool_bytes(value: bool) -> &'static [u8] {
    if value { b"1" } else { b"0" }
}

fn opt_bytes(value: &Option<String>) -> &[u8] {
    value.as_deref().map_or(b"", str::as_bytes)
}

/// Write one request frame: the rendered header, the streamed payload, and
/// the end-of-request byte.
///
/// The payload is never buffered as a whole; it is read into the caller's
/// chunk buffer and written out immediately until the source ends. Returns
/// the number of payload bytes streamed.
pub async fn write_request<W, R>(
    writer: &mut W,
    header: &[u8],
    payload: &mut R,
    chunk: &mut [u8],
) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    writer.write_all(header).await?;

    let mut streamed = 0u64;
    loop {
        let n = payload.read(chunk).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n]).await?;
        streamed += n as u64;
        tracing::trace!("request chunk: {} bytes", n);
    }

    writer.write_all(&[FRAME_END]).await?;
    writer.flush().await?;
    Ok(streamed)
}

/// Read one response frame, forwarding it to `sink` verbatim.
///
/// Chunks are forwarded as read; when a chunk's final byte is the `0x00`
/// delimiter that byte is stripped and reading stops. A zero-length read
/// signals clean end-of-stream and also stops. Returns the number of bytes
/// forwarded.
pub async fn read_response<R, W>(reader: &mut R, sink: &mut W, chunk: &mut [u8]) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut forwarded = 0u64;
    loop {
        let n = reader.read(chunk).await?;
        if n == 0 {
            break;
        }
        tracing::trace!("response chunk: {} bytes", n);
        if chunk[n - 1] == FRAME_END {
            sink.write_all(&chunk[..n - 1]).await?;
            forwarded += (n - 1) as u64;
            break;
        }
        sink.write_all(&chunk[..n]).await?;
        forwarded += n as u64;
    }

    sink.flush().await?;
    Ok(forwarded)
}
