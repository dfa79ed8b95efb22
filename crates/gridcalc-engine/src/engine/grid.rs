//! The grid: dense cell storage, dependency maintenance and propagation.
//!
//! Cells live in a fixed table of `rows * columns` optional slots indexed by
//! [`CellRef::index`]. A slot is occupied only while its cell has a formula or
//! at least one dependent; every mutation below re-checks that with
//! [`Cell::is_vacant`] and frees the slot immediately.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::cell_ref::{MAX_COLUMNS, MAX_REFERENCE_ROW};
use super::cycle::would_create_cycle;
use super::deps::extract_dependencies;
use super::eval::evaluate;
use super::formula::{self, Formula};
use super::{CellRef, EngineError, FormulaError, History};
use crate::builtins::FunctionRegistry;

pub const DEFAULT_ROWS: usize = 6;
pub const DEFAULT_COLUMNS: usize = 13;

/// Upper bound on `rows * columns`.
pub const MAX_CELLS: usize = 100;

/// One non-empty formula of a grid, as persisted by workspace files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEntry {
    pub row: usize,
    pub column: usize,
    pub formula: String,
}

impl CellEntry {
    pub fn cell(&self) -> CellRef {
        CellRef::new(self.row, self.column)
    }
}

#[derive(Debug)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Option<Cell>>,
    registry: FunctionRegistry,
}

impl Default for Grid {
    fn default() -> Self {
        Grid::build(DEFAULT_ROWS, DEFAULT_COLUMNS, FunctionRegistry::with_builtins())
    }
}

impl Grid {
    /// Create an empty `rows` x `columns` grid with the built-in functions.
    ///
    /// Rows are capped at 9 because a reference carries a single row digit;
    /// a larger grid would have rows no formula could name.
    pub fn new(rows: usize, columns: usize) -> Result<Grid, EngineError> {
        Grid::with_registry(rows, columns, FunctionRegistry::with_builtins())
    }

    pub fn with_registry(
        rows: usize,
        columns: usize,
        registry: FunctionRegistry,
    ) -> Result<Grid, EngineError> {
        let invalid = |reason| EngineError::InvalidDimensions {
            rows,
            columns,
            reason,
        };
        if !(1..=MAX_REFERENCE_ROW).contains(&rows) {
            return Err(invalid("rows must be between 1 and 9"));
        }
        if !(1..=MAX_COLUMNS).contains(&columns) {
            return Err(invalid("columns must be between 1 and 26"));
        }
        if rows * columns > MAX_CELLS {
            return Err(invalid("a grid holds at most 100 cells"));
        }
        Ok(Grid::build(rows, columns, registry))
    }

    fn build(rows: usize, columns: usize, registry: FunctionRegistry) -> Grid {
        Grid {
            rows,
            columns,
            cells: vec![None; rows * columns],
            registry,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Validate formula text against this grid's size and functions.
    pub fn validate(&self, text: &str) -> Result<Formula, FormulaError> {
        formula::validate(text, self.rows, self.columns, &self.registry)
    }

    fn slot(&self, cell: CellRef) -> Result<usize, EngineError> {
        if cell.in_bounds(self.rows, self.columns) {
            Ok(cell.index(self.columns))
        } else {
            Err(EngineError::OutOfGrid {
                cell,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    fn cell(&self, cell: CellRef) -> Option<&Cell> {
        if !cell.in_bounds(self.rows, self.columns) {
            return None;
        }
        self.cells[cell.index(self.columns)].as_ref()
    }

    /// Set the formula of `cell`, then recompute it and everything that
    /// depends on it.
    ///
    /// On error nothing has changed: not the grid and not `history`. Pass
    /// `None` for `history` when replaying edits (undo/redo, loading).
    pub fn set_formula(
        &mut self,
        cell: CellRef,
        text: &str,
        history: Option<&mut History>,
    ) -> Result<(), EngineError> {
        let index = self.slot(cell)?;
        let parsed = self.validate(text)?;
        if let Some(via) = would_create_cycle(self, cell, &parsed) {
            return Err(EngineError::CircularDependency { cell, via });
        }

        let old_formula = self.get_formula(cell).to_string();

        let old_deps = self.cells[index]
            .as_ref()
            .map(|c| extract_dependencies(&c.parsed))
            .unwrap_or_default();
        for dep in old_deps {
            let dep_index = dep.index(self.columns);
            if let Some(dep_cell) = self.cells[dep_index].as_mut() {
                dep_cell.dependents.remove(&index);
            }
            self.release_if_vacant(dep_index);
        }

        for dep in extract_dependencies(&parsed) {
            self.cells[dep.index(self.columns)]
                .get_or_insert_with(Cell::placeholder)
                .dependents
                .insert(index);
        }

        if let Some(history) = history {
            history.record(old_formula, text.to_string(), index);
        }

        let slot = self.cells[index].get_or_insert_with(Cell::placeholder);
        slot.formula = text.to_string();
        slot.parsed = parsed;
        if self.release_if_vacant(index) {
            debug!("{} cleared", cell);
            return Ok(());
        }

        self.recompute(index);
        let order = self.recompute_order(index);
        for &dependent in &order {
            self.recompute(dependent);
        }
        debug!(
            "{} = {:?} -> {} ({} dependents recomputed)",
            cell,
            text,
            self.get_value(cell),
            order.len()
        );
        Ok(())
    }

    /// Drop the slot if its cell has become vacant. Returns true if dropped.
    fn release_if_vacant(&mut self, index: usize) -> bool {
        if self.cells[index].as_ref().is_some_and(Cell::is_vacant) {
            self.cells[index] = None;
            true
        } else {
            false
        }
    }

    fn recompute(&mut self, index: usize) {
        let value = match &self.cells[index] {
            Some(cell) => evaluate(&cell.parsed, &self.registry, |r| self.get_value(r)),
            None => return,
        };
        if let Some(cell) = self.cells[index].as_mut() {
            cell.value = value;
        }
    }

    pub(crate) fn dependent_indices(&self, index: usize) -> Vec<usize> {
        self.cells
            .get(index)
            .and_then(Option::as_ref)
            .map(|c| c.dependents.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every transitive dependent of `origin` (not `origin` itself), ordered
    /// so that each cell comes after all the cells it reads.
    ///
    /// Reverse post-order of an iterative depth-first walk over dependents;
    /// each cell appears once even when reachable along several paths.
    fn recompute_order(&self, origin: usize) -> Vec<usize> {
        let mut visited = BTreeSet::from([origin]);
        let mut order = Vec::new();
        let mut stack = vec![(origin, self.dependent_indices(origin))];

        loop {
            let next = match stack.last_mut() {
                Some((_, pending)) => pending.pop(),
                None => break,
            };
            match next {
                Some(child) => {
                    if visited.insert(child) {
                        stack.push((child, self.dependent_indices(child)));
                    }
                }
                None => match stack.pop() {
                    Some((done, _)) if done != origin => order.push(done),
                    _ => {}
                },
            }
        }

        order.reverse();
        order
    }

    /// Cached value of `cell`; 0.0 when absent or outside the grid.
    pub fn get_value(&self, cell: CellRef) -> f64 {
        self.cell(cell).map_or(0.0, |c| c.value)
    }

    /// Formula text of `cell`; empty when absent or outside the grid.
    pub fn get_formula(&self, cell: CellRef) -> &str {
        self.cell(cell).map_or("", |c| c.formula.as_str())
    }

    /// Whether `cell` currently occupies a slot.
    pub fn contains(&self, cell: CellRef) -> bool {
        self.cell(cell).is_some()
    }

    /// Cells whose formula references `cell` directly, in row-major order.
    pub fn dependents(&self, cell: CellRef) -> Vec<CellRef> {
        self.cell(cell)
            .map(|c| {
                c.dependents
                    .iter()
                    .map(|&i| CellRef::from_index(i, self.columns))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every cell whose value may change when `cell` changes, in the order
    /// they are recomputed. Does not include `cell` itself.
    pub fn affected_by(&self, cell: CellRef) -> Vec<CellRef> {
        if !cell.in_bounds(self.rows, self.columns) {
            return Vec::new();
        }
        self.recompute_order(cell.index(self.columns))
            .into_iter()
            .map(|i| CellRef::from_index(i, self.columns))
            .collect()
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (CellRef::from_index(i, self.columns), c)))
    }

    /// Every non-empty formula, in index order.
    pub fn snapshot(&self) -> Vec<CellEntry> {
        self.iter()
            .filter(|(_, c)| !c.formula.is_empty())
            .map(|(cell, c)| CellEntry {
                row: cell.row,
                column: cell.col,
                formula: c.formula.clone(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|slot| *slot = None);
    }

    /// Undo the last edit recorded in `history`.
    ///
    /// The old formula is replayed through [`Grid::set_formula`] without
    /// recording; the history cursor only moves if that replay succeeds.
    pub fn undo(&mut self, history: &mut History) -> Result<CellRef, EngineError> {
        let record = history.undo_entry().ok_or(EngineError::NothingToUndo)?;
        let cell = CellRef::from_index(record.cell, self.columns);
        let formula = record.old_formula.clone();

        self.set_formula(cell, &formula, None)?;
        history.undo()?;
        debug!("undo {} -> {:?}", cell, formula);
        Ok(cell)
    }

    /// Redo the next edit in `history`. Same transactional rules as undo.
    pub fn redo(&mut self, history: &mut History) -> Result<CellRef, EngineError> {
        let record = history.redo_entry().ok_or(EngineError::NothingToRedo)?;
        let cell = CellRef::from_index(record.cell, self.columns);
        let formula = record.new_formula.clone();

        self.set_formula(cell, &formula, None)?;
        history.redo()?;
        debug!("redo {} -> {:?}", cell, formula);
        Ok(cell)
    }
}
