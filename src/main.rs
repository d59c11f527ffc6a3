//! tt - personal task tracker CLI
//!
//! Pending, completed and history lists per user, with progress tracking.

use clap::Parser;
use todo_tracker::cli::Cli;
use todo_tracker::output::emit_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG.
    // Ignore invalid or huge filters instead of failing startup.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let command = cli.command.name();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(command, &err, json);
        std::process::exit(err.exit_code());
    }
}
