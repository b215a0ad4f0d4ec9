use clap::Parser;
use std::process::ExitCode;

use relint::cli::Cli;
use relint::error::exit_codes;
use relint::session;

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    init_tracing();

    let cli = Cli::parse();

    match session::run(&cli).await {
        Ok(_) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Diagnostic tracing to stderr, debug builds only.
///
/// Release builds install no subscriber and stay silent; no control flow
/// anywhere depends on tracing being active. Enable with e.g.
/// `RUST_LOG=relint=trace`.
#[cfg(debug_assertions)]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
