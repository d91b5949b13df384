//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use spotter_cli::CliError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "spotter_cli=info,spotter_core=info,tower_http=info";

fn main() {
    init_tracing();
    match spotter_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            std::process::exit(1);
        }
    }
}

/// Print a fatal error regardless of the log filter.
#[expect(
    clippy::print_stderr,
    reason = "fatal errors must reach the user even when logging is filtered out"
)]
fn report(err: &CliError) {
    eprintln!("spotter: {err}");
}

/// Log to stderr so `spotter query` keeps stdout for JSON output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
