//! User configuration (`config.toml`).
//!
//! Problems with the file never stop the program: they are collected as
//! warnings and the defaults are used instead.

use directories::ProjectDirs;
use gridcalc_core::storage::DEFAULT_SAVE_FILE;
use gridcalc_engine::engine::{DEFAULT_COLUMNS, DEFAULT_HISTORY_LIMIT, DEFAULT_ROWS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_COLUMN_WIDTH: usize = 10;
const MIN_COLUMN_WIDTH: usize = 4;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rows: usize,
    pub columns: usize,
    pub save_file: PathBuf,
    /// 0 keeps every edit.
    pub history_limit: usize,
    pub column_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            save_file: PathBuf::from(DEFAULT_SAVE_FILE),
            history_limit: DEFAULT_HISTORY_LIMIT,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "gridcalc")
}

fn user_config_path() -> Option<PathBuf> {
    let proj = project_dirs()?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Default log file for interactive sessions.
#[cfg_attr(not(feature = "tui"), allow(dead_code))]
pub fn default_log_path() -> Option<PathBuf> {
    let proj = project_dirs()?;
    let mut path = proj.data_dir().to_path_buf();
    path.push("gridcalc.log");
    Some(path)
}

/// Load the configuration.
///
/// `config_file` overrides the platform location; a missing explicit file is
/// a warning, a missing default file is not.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&path, &content, &mut warnings),
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            Config::default()
        }
    };
    (config, warnings)
}

fn parse_config(path: &Path, content: &str, warnings: &mut Vec<String>) -> Config {
    let mut config = match toml::from_str::<Config>(content) {
        Ok(parsed) => parsed,
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            return Config::default();
        }
    };

    if config.column_width < MIN_COLUMN_WIDTH {
        warnings.push(format!(
            "column_width {} is too narrow, using {}",
            config.column_width, MIN_COLUMN_WIDTH
        ));
        config.column_width = MIN_COLUMN_WIDTH;
    }
    config
}
