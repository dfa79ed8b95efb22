use super::Document;
use crate::error::Result;
use gridcalc_engine::engine::{CellRef, format_value};
use log::debug;

impl Document {
    /// Set a cell's formula from user input, recording it for undo.
    ///
    /// Surrounding whitespace is trimmed; an empty input clears the cell.
    pub fn set_formula(&mut self, cell: CellRef, input: &str) -> Result<()> {
        let formula = input.trim();
        self.grid
            .set_formula(cell, formula, Some(&mut self.history))?;
        self.modified = true;
        Ok(())
    }

    /// Clear a cell's formula. Clearing an already empty cell records nothing.
    pub fn clear_cell(&mut self, cell: CellRef) -> Result<()> {
        if self.grid.get_formula(cell).is_empty() {
            return Ok(());
        }
        self.set_formula(cell, "")
    }

    /// Undo the last edit. Returns the cell that changed.
    pub fn undo(&mut self) -> Result<CellRef> {
        let cell = self.grid.undo(&mut self.history)?;
        self.modified = true;
        Ok(cell)
    }

    /// Redo the last undone edit. Returns the cell that changed.
    pub fn redo(&mut self) -> Result<CellRef> {
        let cell = self.grid.redo(&mut self.history)?;
        self.modified = true;
        Ok(cell)
    }

    pub fn get_value(&self, cell: CellRef) -> f64 {
        self.grid.get_value(cell)
    }

    pub fn get_formula(&self, cell: CellRef) -> &str {
        self.grid.get_formula(cell)
    }

    /// Grid text for a cell: the value with two decimals, or blank for a cell
    /// without a formula.
    pub fn display(&self, cell: CellRef) -> String {
        if self.grid.get_formula(cell).is_empty() {
            String::new()
        } else {
            format_value(self.grid.get_value(cell))
        }
    }

    /// `cell` plus every cell recomputed when it changes.
    pub fn changed_by(&self, cell: CellRef) -> Vec<CellRef> {
        let mut cells = vec![cell];
        cells.extend(self.grid.affected_by(cell));
        debug!("{} change touches {} cells", cell, cells.len());
        cells
    }
}
