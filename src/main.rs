use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use trackline::cli::commands::Cli;
use trackline::cli::handlers::{self, Context};

const LOG_ENV: &str = "TRACKLINE_LOG";

fn main() {
    let cli = Cli::parse();
    let ctx = match Context::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        // No subcommand → launch TUI
        None => {
            init_tui_logging();
            trackline::tui::run(&ctx.path, &ctx.config)
        }
        Some(command) => {
            init_cli_logging();
            handlers::dispatch(&ctx, command)
        }
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_cli_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The terminal belongs to the UI, so logs go to a file and only on request
fn init_tui_logging() {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return;
    };
    let path = std::env::temp_dir().join("trackline.log");
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
