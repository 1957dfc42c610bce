//! # Ted - A Small Multi-Document Text Editor
//!
//! Several documents open at once, find/replace with wrap-around, and
//! close flows that never lose unsaved work without asking.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with an empty document
//! cargo run
//!
//! # Open files
//! cargo run -- notes.txt todo.md
//!
//! # Log at debug level
//! cargo run -- -vv notes.txt
//! ```

mod console;

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ted_core::{Config, PersistedState, Session};

/// Ted - a small multi-document text editor
#[derive(Parser, Debug)]
#[command(name = "ted")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to open
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Neither read nor write recent files and the last search
    #[arg(long)]
    no_state: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load()),
    }
}

fn load_state(enabled: bool) -> (PersistedState, Option<PathBuf>) {
    if !enabled {
        return (PersistedState::default(), None);
    }
    let path = match PersistedState::default_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Not keeping state: {}", e);
            return (PersistedState::default(), None);
        }
    };
    let state = PersistedState::load_from(&path).unwrap_or_else(|e| {
        tracing::warn!("Ignoring state file {}: {}", path.display(), e);
        PersistedState::default()
    });
    (state, Some(path))
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Ted v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_ref())?;
    let (state, state_path) = load_state(!args.no_state);

    let (frontend, menu) = console::frontend();
    let mut session: Session = Session::new(frontend, config, state);

    for file in &args.files {
        // Failures are reported by the session; keep opening the rest
        if let Err(e) = session.open(file) {
            tracing::debug!(path = %file.display(), "Skipped: {}", e);
        }
    }
    if session.is_empty() {
        session.new_document();
    }

    console::run(&mut session, &menu)?;

    if let Some(path) = state_path {
        session
            .persisted_state()
            .save_to(&path)
            .with_context(|| format!("Failed to save state to {}", path.display()))?;
    }

    Ok(())
}
