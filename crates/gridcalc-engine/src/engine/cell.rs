//! The per-slot cell record stored by the grid.

use std::collections::BTreeSet;

use super::formula::Formula;

/// A cell in the grid.
///
/// A slot holds a `Cell` only while it has a formula or at least one
/// dependent; see [`Cell::is_vacant`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Formula text exactly as entered. Empty means "no formula, value 0".
    pub formula: String,
    /// `formula` parsed once on entry.
    pub parsed: Formula,
    /// Last computed value.
    pub value: f64,
    /// Slot indices of cells whose formula references this one.
    pub dependents: BTreeSet<usize>,
}

impl Cell {
    /// An empty cell created only to carry dependents.
    pub fn placeholder() -> Cell {
        Cell::default()
    }

    /// True when nothing justifies keeping the slot.
    pub fn is_vacant(&self) -> bool {
        self.formula.is_empty() && self.dependents.is_empty()
    }
}
