//! Gridcalc - a terminal spreadsheet with postfix formulas

mod config;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gridcalc_core::{CellRef, Document};
use gridcalc_engine::engine::{Grid, format_number};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{Config, load_config};

#[derive(Debug, Parser)]
#[command(name = "gridcalc", version, about = "Terminal spreadsheet with postfix formulas")]
struct Cli {
    /// XML save file holding the named workspaces
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Workspace to export (with --export)
    #[arg(short, long, value_name = "NAME")]
    workspace: Option<String>,

    /// Grid rows (1-9)
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns (1-26)
    #[arg(long)]
    columns: Option<usize>,

    /// Read configuration from this file
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore the configuration file
    #[arg(long)]
    no_config: bool,

    /// Log file used while the terminal UI is running
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Export a workspace to CSV or Markdown (by extension) and exit
    #[arg(short = 'o', long, value_name = "OUT", requires = "workspace")]
    export: Option<PathBuf>,

    /// Evaluate one formula on an empty grid, print the value and exit
    #[arg(short = 'c', long = "command", value_name = "FORMULA")]
    command: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> (Config, Vec<String>) {
        let (mut config, warnings) = if self.no_config {
            (Config::default(), Vec::new())
        } else {
            load_config(self.config.as_ref())
        };
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(file) = &self.file {
            config.save_file = file.clone();
        }
        (config, warnings)
    }
}

/// Evaluate `formula` in cell A1 of an empty grid.
fn evaluate_command(config: &Config, formula: &str) -> gridcalc_core::Result<f64> {
    let mut grid = Grid::new(config.rows, config.columns)?;
    let cell = CellRef::new(1, 1);
    grid.set_formula(cell, formula.trim(), None)?;
    Ok(grid.get_value(cell))
}

fn export(config: &Config, workspace: &str, out: &Path) -> Result<()> {
    let mut doc = Document::new(config.rows, config.columns, config.history_limit)?;
    let report = doc
        .load_workspace(&config.save_file, workspace)
        .with_context(|| format!("loading {} from {}", workspace, config.save_file.display()))?;
    if report.skipped > 0 {
        eprintln!("Warning: {} stored cells did not fit and were skipped", report.skipped);
    }
    doc.export(out)
        .with_context(|| format!("exporting to {}", out.display()))?;
    println!("Exported to {}", out.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_tui(cli: &Cli, config: Config) -> Result<()> {
    let log_path = cli.log_file.clone().or_else(config::default_log_path);
    if let Some(warning) = logging::init_tui(log_path.as_deref()) {
        eprintln!("Warning: {}", warning);
    }
    let mut app = tui::App::new(config)?;
    tui::run(&mut app).context("terminal UI failed")?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_tui(_cli: &Cli, _config: Config) -> Result<()> {
    bail!("built without the terminal UI; use -c or --export")
}

fn run(cli: Cli) -> Result<ExitCode> {
    let interactive = cli.command.is_none() && cli.export.is_none();
    if !interactive {
        logging::init_stderr();
    }

    let (config, warnings) = cli.resolve_config();
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    // Reject bad dimensions before touching any file or the terminal.
    Grid::new(config.rows, config.columns)?;

    if let Some(formula) = &cli.command {
        return Ok(match evaluate_command(&config, formula) {
            Ok(value) => {
                println!("{}", format_number(value));
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("#ERR: {}", e);
                ExitCode::FAILURE
            }
        });
    }

    if let Some(out) = &cli.export {
        let Some(workspace) = cli.workspace.as_deref() else {
            bail!("--export needs --workspace");
        };
        export(&config, workspace, out)?;
        return Ok(ExitCode::SUCCESS);
    }

    run_tui(&cli, config)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from(["gridcalc", "--no-config", "--rows", "3", "-f", "book.xml"]);
        let (config, warnings) = cli.resolve_config();
        assert!(warnings.is_empty());
        assert_eq!(config.rows, 3);
        assert_eq!(config.columns, Config::default().columns);
        assert_eq!(config.save_file, PathBuf::from("book.xml"));
    }

    #[test]
    fn test_export_requires_workspace() {
        assert!(Cli::try_parse_from(["gridcalc", "--export", "out.csv"]).is_err());
    }

    #[test]
    fn test_evaluate_command() {
        let config = Config::default();
        assert_eq!(evaluate_command(&config, " 5 3 + ").unwrap(), 8.0);
        assert_eq!(evaluate_command(&config, "mean(1, 2, 6)").unwrap(), 3.0);
        assert!(evaluate_command(&config, "A1 1 +").is_err());
    }

    #[test]
    fn test_export_writes_loaded_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            save_file: dir.path().join("save.xml"),
            ..Config::default()
        };
        let mut doc = Document::default();
        doc.set_formula(CellRef::new(1, 1), "4").unwrap();
        doc.set_formula(CellRef::new(1, 2), "A1 A1 *").unwrap();
        doc.save_workspace(&config.save_file, Some("Sq")).unwrap();

        let out = dir.path().join("sq.csv");
        export(&config, "Sq", &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "4.00,16.00\n");
    }
}
