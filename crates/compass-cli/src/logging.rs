//! Logging setup
//!
//! Logs go to stderr unless `log_file` is configured. The level defaults to
//! `warn`, `--verbose` raises it to `debug`, and `COMPASS_LOG` overrides both.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use compass_core::Config;

/// Initialize logging for the CLI
pub fn init(config: &Config, verbose: bool) {
    let log_level = std::env::var("COMPASS_LOG")
        .ok()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string());

    let env_filter = filter_for(&log_level);

    let Some(log_path) = &config.log_file else {
        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();

    debug!("Logging to {:?}", log_path);
}

fn filter_for(log_level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "compass_core={},compass_cli={}",
        log_level, log_level
    ))
}
