//! planviz - Project plan visualizer CLI
//!
//! A standalone CLI that stores project plans (tasks, dependencies, and mail
//! threads) and renders them as timeline, status, and dependency reports.

use clap::Parser;
use planviz::cli::Cli;
use planviz::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG, or --verbose for debug events.
    // Keep startup robust: ignore invalid/huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| {
            if cli.verbose {
                EnvFilter::new("planviz=debug")
            } else {
                EnvFilter::new("off")
            }
        });

    // Events go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
