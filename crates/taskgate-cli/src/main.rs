//! Taskgate - interactive shell over the task application's session layer.
//!
//! Restores the saved cookie store, checks the session the same way the web
//! client does on first navigation, and lets the user log in, register, log
//! out and navigate between the guarded routes.

mod command;
mod shell;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shell::Shell;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Taskgate starting");

    let mut shell = Shell::new()?;
    let result = shell.run().await;
    shell.shutdown();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Taskgate shutting down");
    Ok(())
}
