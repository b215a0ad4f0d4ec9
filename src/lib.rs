//! Relint - a lint daemon client that keeps slow linters warm
//!
//! Relint relays each command-line invocation to a long-lived background
//! daemon (`relintd`) over a local IPC channel, starting the daemon on
//! demand. The daemon keeps the expensive linter state warm across
//! invocations; the client stays small, fast, and bounded.

pub mod arena;
pub mod cli;
pub mod daemon;
pub mod error;
pub mod session;

pub use error::{RelintError, Result};
