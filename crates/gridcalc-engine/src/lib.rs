//! gridcalc_engine - Cell engine: postfix formulas, dependency graph, undo/redo.

pub(crate) mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use proptest::prelude::*;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn every_cell(grid: &Grid) -> Vec<CellRef> {
        (1..=grid.rows())
            .flat_map(|row| (1..=grid.columns()).map(move |col| CellRef::new(row, col)))
            .collect()
    }

    /// Formula text and value of every cell, for before/after comparisons.
    fn state_of(grid: &Grid) -> Vec<(CellRef, String, f64, bool)> {
        every_cell(grid)
            .into_iter()
            .map(|c| {
                (
                    c,
                    grid.get_formula(c).to_string(),
                    grid.get_value(c),
                    grid.contains(c),
                )
            })
            .collect()
    }

    fn sample_grid() -> (Grid, History) {
        let mut grid = Grid::default();
        let mut history = History::new();
        for (name, formula) in [
            ("A1", "5"),
            ("A2", "2"),
            ("B1", "A1 1 +"),
            ("C1", "B1 2 *"),
            ("D2", "sum(A1:C1)"),
        ] {
            grid.set_formula(cell(name), formula, Some(&mut history))
                .unwrap();
        }
        (grid, history)
    }

    #[test]
    fn test_cycle_rejected_and_cell_left_unset() {
        let mut grid = Grid::default();
        grid.set_formula(cell("A1"), "B1+0", None).unwrap();
        let result = grid.set_formula(cell("B1"), "A1+0", None);

        assert_eq!(
            result,
            Err(EngineError::CircularDependency {
                cell: cell("B1"),
                via: cell("A1")
            })
        );
        assert_eq!(grid.get_formula(cell("B1")), "");
        assert_eq!(grid.dependents(cell("A1")), Vec::new());
        assert_eq!(grid.dependents(cell("B1")), vec![cell("A1")]);
    }

    #[test]
    fn test_propagation_through_chain() {
        let mut grid = Grid::default();
        grid.set_formula(cell("A1"), "5", None).unwrap();
        grid.set_formula(cell("B1"), "A1+1", None).unwrap();
        grid.set_formula(cell("C1"), "B1*2", None).unwrap();
        assert_eq!(grid.get_value(cell("C1")), 12.0);

        grid.set_formula(cell("A1"), "10", None).unwrap();
        assert_eq!(grid.get_value(cell("B1")), 11.0);
        assert_eq!(grid.get_value(cell("C1")), 22.0);
    }

    #[test]
    fn test_range_aggregation() {
        let mut grid = Grid::default();
        grid.set_formula(cell("A1"), "1", None).unwrap();
        grid.set_formula(cell("A2"), "2", None).unwrap();
        grid.set_formula(cell("A3"), "3", None).unwrap();

        grid.set_formula(cell("B1"), "sum(A1:A3)", None).unwrap();
        assert_eq!(grid.get_value(cell("B1")), 6.0);
        grid.set_formula(cell("B1"), "mean(A1:A3)", None).unwrap();
        assert_eq!(grid.get_value(cell("B1")), 2.0);
    }

    #[test]
    fn test_division_by_zero_keeps_dividend() {
        let mut grid = Grid::default();
        grid.set_formula(cell("A1"), "5 0/", None).unwrap();
        let value = grid.get_value(cell("A1"));
        assert_eq!(value, 5.0);
        assert!(value.is_finite());
    }

    #[test]
    fn test_empty_aggregates_display_as_zero() {
        let mut grid = Grid::default();
        for (name, formula) in [("A1", "sum()"), ("B1", "mean()"), ("C1", "sum(D1:E2)")] {
            grid.set_formula(cell(name), formula, None).unwrap();
            let value = grid.get_value(cell(name));
            assert_eq!(format_value(value), "0.00", "{formula}");
            assert_eq!(format_number(value), "0", "{formula}");
        }
    }

    #[test]
    fn test_tombstone_cleanup() {
        let mut grid = Grid::default();
        grid.set_formula(cell("A1"), "7", None).unwrap();
        grid.set_formula(cell("A1"), "", None).unwrap();
        assert_eq!(grid.get_formula(cell("A1")), "");
        assert!(!grid.contains(cell("A1")));

        grid.set_formula(cell("A1"), "7", None).unwrap();
        grid.set_formula(cell("B1"), "A1 1 +", None).unwrap();
        grid.set_formula(cell("A1"), "", None).unwrap();
        assert!(grid.contains(cell("A1")));
        assert_eq!(grid.get_value(cell("A1")), 0.0);
        assert_eq!(grid.get_value(cell("B1")), 1.0);

        grid.set_formula(cell("B1"), "", None).unwrap();
        assert!(!grid.contains(cell("A1")));
        assert!(!grid.contains(cell("B1")));
    }

    #[test]
    fn test_history_truncation() {
        let (mut grid, mut history) = sample_grid();
        grid.undo(&mut history).unwrap();
        assert!(history.can_redo());

        grid.set_formula(cell("E1"), "1", Some(&mut history)).unwrap();
        assert!(!history.can_redo());
        assert_eq!(grid.redo(&mut history), Err(EngineError::NothingToRedo));
    }

    #[test]
    fn test_undo_with_empty_history_is_a_noop() {
        let mut grid = Grid::default();
        let mut history = History::new();
        assert_eq!(grid.undo(&mut history), Err(EngineError::NothingToUndo));
        assert_eq!(grid.redo(&mut history), Err(EngineError::NothingToRedo));
    }

    #[test]
    fn test_undo_redo_inverse_for_every_step() {
        let (mut grid, mut history) = sample_grid();
        while history.can_undo() {
            let before = state_of(&grid);
            grid.undo(&mut history).unwrap();
            grid.redo(&mut history).unwrap();
            assert_eq!(state_of(&grid), before);
            grid.undo(&mut history).unwrap();
        }
        assert!(grid.snapshot().is_empty());

        while history.can_redo() {
            grid.redo(&mut history).unwrap();
        }
        assert_eq!(grid.get_value(cell("D2")), 23.0);
    }

    #[test]
    fn test_failed_replay_leaves_cursor_in_place() {
        let mut grid = Grid::default();
        let mut history = History::new();
        grid.set_formula(cell("B1"), "A1", Some(&mut history)).unwrap();
        // Redo of B1 = "A1" becomes cyclic once A1 reads B1.
        grid.undo(&mut history).unwrap();
        grid.set_formula(cell("A1"), "B1", None).unwrap();

        assert!(matches!(
            grid.redo(&mut history),
            Err(EngineError::CircularDependency { .. })
        ));
        assert_eq!(history.cursor(), 0);
        assert!(history.can_redo());
    }

    #[test]
    fn test_history_records_each_successful_edit_once() {
        let (mut grid, mut history) = sample_grid();
        assert_eq!(history.len(), 5);
        assert!(grid.set_formula(cell("A1"), "1 +", Some(&mut history)).is_err());
        assert_eq!(history.len(), 5);

        assert_eq!(
            history.undo_entry(),
            Some(&EditRecord {
                old_formula: String::new(),
                new_formula: "sum(A1:C1)".to_string(),
                cell: cell("D2").index(grid.columns()),
            })
        );
    }

    fn formula_strategy() -> impl Strategy<Value = String> {
        let atom = prop_oneof![
            (0u32..20).prop_map(|n| n.to_string()),
            ("[A-F]", 1u8..=7).prop_map(|(c, r)| format!("{c}{r}")),
            Just("sum(A1:B2)".to_string()),
            Just("mean(".to_string()),
            Just("%".to_string()),
        ];
        let op = prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")];
        proptest::collection::vec((atom, op), 0..4).prop_map(|parts| {
            parts
                .into_iter()
                .enumerate()
                .map(|(i, (atom, op))| if i % 2 == 0 { atom } else { format!("{atom} {op}") })
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    proptest! {
        #[test]
        fn prop_rejected_formulas_change_nothing(text in formula_strategy(), target in ("[A-F]", 1u8..=6)) {
            let (mut grid, mut history) = sample_grid();
            let target = cell(&format!("{}{}", target.0, target.1));
            let before = state_of(&grid);
            let cursor = history.cursor();
            let len = history.len();

            if grid.set_formula(target, &text, Some(&mut history)).is_err() {
                prop_assert_eq!(state_of(&grid), before);
                prop_assert_eq!(history.cursor(), cursor);
                prop_assert_eq!(history.len(), len);
            } else {
                prop_assert_eq!(grid.get_formula(target), text.as_str());
            }
        }

        #[test]
        fn prop_accepted_formula_round_trips(a in 0u32..100, b in 0u32..100, op in "[-+*/]") {
            let mut grid = Grid::default();
            let text = format!("{a} {b} {op}");
            grid.set_formula(cell("C3"), &text, None).unwrap();
            prop_assert_eq!(grid.get_formula(cell("C3")), text.as_str());
            prop_assert!(grid.get_value(cell("C3")).is_finite());
        }
    }
}
