//! One bounded client session.
//!
//! A session is the whole life of one invocation: render the request
//! header, reach the daemon (starting it if needed), stream standard input
//! through the channel, and relay the response to standard output. All
//! buffers come out of a single fixed-size [`SessionArena`]; the
//! connection is closed on every exit path, success or error.

use crate::arena::{SESSION_ARENA_CAPACITY, SessionArena};
use crate::cli::Cli;
use crate::daemon::{RequestOptions, ensure_daemon};
use crate::error::Result;

/// Run one invocation against the daemon.
///
/// Returns the number of response bytes relayed to standard output.
pub async fn run(cli: &Cli) -> Result<u64> {
    let cwd = std::env::current_dir()?;
    let mut arena = SessionArena::new(SESSION_ARENA_CAPACITY);

    // The header is rendered in full before connecting; a request that
    // cannot fit the session budget never reaches the wire.
    let options = RequestOptions::from_cli(cli);
    let header = options.render(&cwd, &mut arena)?;

    let mut client = ensure_daemon().await?;

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let relayed = client
        .relay(header.as_slice(), &mut stdin, &mut stdout, &mut arena)
        .await?;

    tracing::debug!("session done: {} response bytes", relayed);
    Ok(relayed)
}
