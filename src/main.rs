//! Procrastination Predictor
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use procrastination_predictor::config::{Config, LogMode};
use procrastination_predictor::tui::App;

fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen),
    // so an interactive session logs to a file unless told otherwise.
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stdout => false,
        LogMode::Auto => std::io::stdout().is_terminal(),
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    tracing::info!("Starting Procrastination Predictor...");

    // A model that fails to load or verify is fatal.
    let mut app = App::new(&config).map_err(|e| {
        tracing::error!("Startup failed: {}", e);
        e
    })?;
    app.run()?;

    tracing::info!("Procrastination Predictor shutdown complete.");
    Ok(())
}
