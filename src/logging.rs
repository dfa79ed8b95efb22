//! Logger setup.
//!
//! The filter comes from `GRIDCALC_LOG` (env_logger syntax, default `warn`).
//! While the terminal UI owns the screen, records go to a file instead of
//! stderr.

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

pub const LOG_ENV: &str = "GRIDCALC_LOG";

fn builder() -> Builder {
    Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"))
}

/// Log to stderr.
pub fn init_stderr() {
    let _ = builder().target(Target::Stderr).try_init();
}

/// Append log records to `path`, creating parent directories as needed.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
fn init_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let _ = builder()
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init();
    Ok(())
}

/// Logger setup for the terminal UI. A log file that cannot be opened only
/// disables logging; the returned warning is meant for stderr before the
/// terminal is taken over.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
pub fn init_tui(path: Option<&Path>) -> Option<String> {
    let path = path?;
    init_file(path)
        .err()
        .map(|err| format!("logging disabled: {:#}", err))
}
