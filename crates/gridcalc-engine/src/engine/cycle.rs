//! Circular dependency detection for formula cells.
//!
//! Runs before a formula is committed, against the graph as it stands. A new
//! formula in `cell` adds edges `dest -> cell` for every cell it reads; such
//! an edge closes a loop exactly when `dest` already recomputes whenever
//! `cell` changes, i.e. when `dest` is reachable from `cell` over dependents.

use std::collections::BTreeSet;

use log::trace;

use super::deps::extract_dependencies;
use super::formula::Formula;
use super::{CellRef, Grid};

/// Check whether storing `formula` in `cell` would create a cycle.
/// Returns the referenced cell that would close the loop, if any.
pub fn would_create_cycle(grid: &Grid, cell: CellRef, formula: &Formula) -> Option<CellRef> {
    let targets = extract_dependencies(formula);
    if targets.is_empty() {
        return None;
    }
    if targets.contains(&cell) {
        trace!("cycle check: {} references itself", cell);
        return Some(cell);
    }

    let columns = grid.columns();
    let reachable = reachable_dependents(grid, cell.index(columns));
    trace!(
        "cycle check: {} has {} transitive dependents",
        cell,
        reachable.len()
    );

    targets
        .into_iter()
        .filter(|t| t.in_bounds(grid.rows(), columns))
        .find(|t| reachable.contains(&t.index(columns)))
}

/// Every slot reachable from `origin` over dependents, excluding `origin`
/// unless a loop leads back to it.
fn reachable_dependents(grid: &Grid, origin: usize) -> BTreeSet<usize> {
    let mut seen = BTreeSet::new();
    let mut work = grid.dependent_indices(origin);

    while let Some(index) = work.pop() {
        if seen.insert(index) {
            work.extend(grid.dependent_indices(index));
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, History};

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn parsed(grid: &Grid, text: &str) -> Formula {
        grid.validate(text).unwrap()
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let grid = Grid::default();
        let formula = parsed(&grid, "A1 1 +");
        assert_eq!(would_create_cycle(&grid, cell("A1"), &formula), Some(cell("A1")));

        let formula = parsed(&grid, "sum(A1:B2)");
        assert_eq!(would_create_cycle(&grid, cell("B2"), &formula), Some(cell("B2")));
    }

    #[test]
    fn test_indirect_loop_is_detected() {
        let mut grid = Grid::default();
        grid.set_formula(cell("B1"), "A1 1 +", None).unwrap();
        grid.set_formula(cell("C1"), "B1 2 *", None).unwrap();

        let formula = parsed(&grid, "C1");
        assert_eq!(would_create_cycle(&grid, cell("A1"), &formula), Some(cell("C1")));
    }

    #[test]
    fn test_loop_closed_through_range_is_detected() {
        let mut grid = Grid::default();
        grid.set_formula(cell("B1"), "A1 1 +", None).unwrap();
        grid.set_formula(cell("C1"), "A1 2 *", None).unwrap();

        let formula = parsed(&grid, "sum(B1:C1)");
        assert_eq!(would_create_cycle(&grid, cell("A1"), &formula), Some(cell("B1")));

        let err = grid.set_formula(cell("A1"), "sum(B1:C1)", None).unwrap_err();
        assert_eq!(
            err,
            EngineError::CircularDependency {
                cell: cell("A1"),
                via: cell("B1"),
            }
        );
        assert_eq!(grid.get_formula(cell("A1")), "");
        assert_eq!(grid.get_value(cell("C1")), 0.0);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut grid = Grid::default();
        let mut history = History::new();
        grid.set_formula(cell("B1"), "A1", Some(&mut history)).unwrap();
        grid.set_formula(cell("B2"), "A1", Some(&mut history)).unwrap();

        let formula = parsed(&grid, "B1 B2 +");
        assert_eq!(would_create_cycle(&grid, cell("C1"), &formula), None);
    }

    #[test]
    fn test_constant_formula_never_cycles() {
        let grid = Grid::default();
        let formula = parsed(&grid, "5 0/");
        assert_eq!(would_create_cycle(&grid, cell("A1"), &formula), None);
    }
}
