//! prereqs CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use prereqs::cli::{Cli, CommandDispatcher};
use prereqs::ui::ConsoleReporter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("prereqs=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prereqs=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("prereqs starting with args: {:?}", cli);

    let console = ConsoleReporter::new(cli.verbose);

    let result = cli
        .resolve_config()
        .and_then(|config| CommandDispatcher::new(config).dispatch(&cli, &console));

    match result {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            console.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
