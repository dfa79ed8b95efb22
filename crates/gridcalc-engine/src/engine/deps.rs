//! Dependency extraction from parsed formulas.
//!
//! Walks the token list of a [`Formula`] and collects every cell it reads:
//! plain references and every cell of every range argument. This is used to
//! maintain the dependents graph and by the cycle check.

use super::formula::{Argument, Formula, Token};
use super::CellRef;

/// All cells a formula reads, without duplicates, in first-seen order.
pub fn extract_dependencies(formula: &Formula) -> Vec<CellRef> {
    let mut deps = Vec::new();
    let mut push = |cell: CellRef| {
        if !deps.contains(&cell) {
            deps.push(cell);
        }
    };

    for token in formula.tokens() {
        match token {
            Token::Ref(cell) => push(*cell),
            Token::Call { args, .. } => {
                for arg in args {
                    match arg {
                        Argument::Number(_) => {}
                        Argument::Ref(cell) => push(*cell),
                        Argument::Range(a, b) => expand_range(*a, *b).into_iter().for_each(&mut push),
                    }
                }
            }
            Token::Number(_) | Token::Operator(_) => {}
        }
    }

    deps
}

/// Every cell of the rectangle spanned by two corners, row-major.
/// The corners may be given in any order.
pub fn expand_range(a: CellRef, b: CellRef) -> Vec<CellRef> {
    let (min_row, max_row) = (a.row.min(b.row), a.row.max(b.row));
    let (min_col, max_col) = (a.col.min(b.col), a.col.max(b.col));

    let mut cells = Vec::with_capacity((max_row - min_row + 1) * (max_col - min_col + 1));
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            cells.push(CellRef::new(row, col));
        }
    }
    cells
}
