use super::Document;
use crate::error::{GridcalcError, Result};
use crate::storage::{WorkspaceFile, write_csv, write_markdown};
use gridcalc_engine::engine::Grid;
use log::{debug, warn};
use std::path::Path;

/// Outcome of loading a workspace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Stored cells rejected on replay (outside the grid, invalid formula).
    pub skipped: usize,
}

impl Document {
    /// Replace the grid with workspace `name` from the save file at `path`.
    ///
    /// Cells are replayed in stored order without recording history. The
    /// document is untouched if the file cannot be read or has no such
    /// workspace.
    pub fn load_workspace(&mut self, path: &Path, name: &str) -> Result<LoadReport> {
        let file = WorkspaceFile::open(path)?;
        let entries = file
            .workspace(name)
            .ok_or_else(|| GridcalcError::WorkspaceNotFound(name.to_string()))?;

        let mut grid = Grid::new(self.grid.rows(), self.grid.columns())?;
        let mut report = LoadReport::default();
        for entry in entries {
            match grid.set_formula(entry.cell(), &entry.formula, None) {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    warn!(
                        "workspace {}: skipping row {} column {} ({:?}): {}",
                        name, entry.row, entry.column, entry.formula, e
                    );
                    report.skipped += 1;
                }
            }
        }

        self.grid = grid;
        self.history.clear();
        self.workspace = Some(name.to_string());
        self.modified = false;
        debug!(
            "loaded workspace {} ({} cells, {} skipped)",
            name, report.loaded, report.skipped
        );
        Ok(report)
    }

    /// Save the grid into the save file at `path` as workspace `name`, or
    /// under the current workspace name when `name` is None. Other
    /// workspaces in the file are kept. Returns the name saved under.
    pub fn save_workspace(&mut self, path: &Path, name: Option<&str>) -> Result<String> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.workspace.clone().ok_or(GridcalcError::NoWorkspace)?,
        };

        let mut file = WorkspaceFile::open(path)?;
        file.set_workspace(&name, self.grid.snapshot())?;
        file.save()?;

        self.workspace = Some(name.clone());
        self.modified = false;
        Ok(name)
    }

    /// Export computed values: Markdown for `.md`/`.markdown` paths, CSV
    /// otherwise.
    pub fn export(&self, path: &Path) -> Result<()> {
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));
        if is_markdown {
            let title = self.workspace.as_deref().unwrap_or("Sheet");
            write_markdown(path, &self.grid, title)
        } else {
            write_csv(path, &self.grid)
        }
    }
}
