use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};
use undo_entry_config::AppConfig;
use undo_entry_core::{EditScript, Entry, EntryReport, HistoryConfig};

/// Replays an editing session through a text entry with coalescing undo.
#[derive(Parser, Debug)]
#[command(name = "undo-entry", version, about)]
struct Cli {
    /// JSON edit script to replay.
    script: PathBuf,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with undo tracking disabled.
    #[arg(long)]
    no_undo: bool,

    /// Override the maximum number of undo groups.
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print a report after every action, not just at the end.
    #[arg(long)]
    steps: bool,

    /// Include the undo and redo stacks in the final report.
    #[arg(long)]
    dump_history: bool,
}

/// Filter used until the config is loaded, and when its filter is invalid.
const DEFAULT_LOG_FILTER: &str = "info";

/// The configured log filter, unless `RUST_LOG` already chose one.
fn config_log_filter(from_env: bool, config: &AppConfig) -> Option<EnvFilter> {
    if from_env {
        return None;
    }
    match EnvFilter::try_new(&config.log_filter) {
        Ok(filter) => Some(filter),
        Err(e) => {
            tracing::warn!("Ignoring invalid log filter {:?}: {e}", config.log_filter);
            None
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before the config so its warnings are not lost
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_or_create(&config_path);
    if let Some(depth) = cli.max_depth {
        config.max_history_depth = depth;
    }
    if cli.no_undo {
        config.undo_enabled = false;
    }
    config.sanitize();

    if let Some(filter) = config_log_filter(from_env, &config) {
        if let Err(e) = filter_handle.reload(filter) {
            tracing::warn!("Failed to apply configured log filter: {e}");
        }
    }

    tracing::info!(
        "Starting undo-entry with config {} (undo: {}, max depth: {})",
        config_path.display(),
        config.undo_enabled,
        config.max_history_depth
    );

    let script = EditScript::load(&cli.script)?;
    let mut entry = Entry::with_config(HistoryConfig::from(&config), config.undo_enabled);

    if cli.steps {
        script.run_with(&mut entry, |step, action, entry| {
            let report = EntryReport::from_entry(entry, false);
            match serde_json::to_string(&report) {
                Ok(json) => println!("{step}\t{action:?}\t{json}"),
                Err(e) => tracing::warn!("Failed to serialize report for step {step}: {e}"),
            }
        })?;
    } else {
        script.run(&mut entry)?;
    }

    let report = EntryReport::from_entry(&entry, cli.dump_history);
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");

    tracing::info!(
        "Replayed {} actions from {}",
        script.actions.len(),
        cli.script.display()
    );
    Ok(())
}
