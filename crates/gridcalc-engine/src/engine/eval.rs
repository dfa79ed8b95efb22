//! Value stack evaluation of parsed formulas.

use super::deps::expand_range;
use super::formula::{Argument, Formula, Token};
use super::CellRef;
use crate::builtins::FunctionRegistry;

/// Evaluate a parsed formula.
///
/// `lookup` returns the cached value of another cell (0.0 for absent cells).
/// Validation guarantees a balanced stack; should a pop ever come up empty
/// it reads as 0.0, and an empty final stack is 0.0 as well.
pub fn evaluate<F>(formula: &Formula, registry: &FunctionRegistry, lookup: F) -> f64
where
    F: Fn(CellRef) -> f64,
{
    let mut stack: Vec<f64> = Vec::with_capacity(formula.tokens().len());

    for token in formula.tokens() {
        match token {
            Token::Number(n) => stack.push(*n),
            Token::Ref(cell) => stack.push(lookup(*cell)),
            Token::Operator(op) => {
                let b = stack.pop().unwrap_or(0.0);
                let a = stack.pop().unwrap_or(0.0);
                stack.push(op.apply(a, b));
            }
            Token::Call { name, args } => {
                let values = collect_arguments(args, &lookup);
                stack.push(registry.call(name, &values).unwrap_or(0.0));
            }
        }
    }

    stack.pop().unwrap_or(0.0)
}

fn collect_arguments<F>(args: &[Argument], lookup: &F) -> Vec<f64>
where
    F: Fn(CellRef) -> f64,
{
    let mut values = Vec::new();
    for arg in args {
        match arg {
            Argument::Number(n) => values.push(*n),
            Argument::Ref(cell) => values.push(lookup(*cell)),
            Argument::Range(a, b) => values.extend(expand_range(*a, *b).into_iter().map(lookup)),
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_formula;
    use std::collections::HashMap;

    fn eval_with(text: &str, cells: &[(&str, f64)]) -> f64 {
        let registry = FunctionRegistry::with_builtins();
        let values: HashMap<CellRef, f64> = cells
            .iter()
            .map(|(name, v)| (CellRef::from_str(name).unwrap(), *v))
            .collect();
        let formula = parse_formula(text, &registry).unwrap();
        evaluate(&formula, &registry, |cell| {
            values.get(&cell).copied().unwrap_or(0.0)
        })
    }

    #[test]
    fn test_postfix_arithmetic() {
        assert_eq!(eval_with("5 3 +", &[]), 8.0);
        assert_eq!(eval_with("10 4 -", &[]), 6.0);
        assert_eq!(eval_with("2 3 4 * +", &[]), 14.0);
        assert_eq!(eval_with("7 2 /", &[]), 3.5);
    }

    #[test]
    fn test_division_by_zero_returns_dividend() {
        assert_eq!(eval_with("5 0/", &[]), 5.0);
        assert_eq!(eval_with("A1 B1 /", &[("A1", -3.0)]), -3.0);
    }

    #[test]
    fn test_infix_follows_precedence() {
        assert_eq!(eval_with("2+3*4", &[]), 14.0);
        assert_eq!(eval_with("8-2-1", &[]), 5.0);
        assert_eq!(eval_with("A1*2", &[("A1", 4.5)]), 9.0);
    }

    #[test]
    fn test_absent_references_read_as_zero() {
        assert_eq!(eval_with("A1 B2 +", &[("A1", 2.0)]), 2.0);
    }

    #[test]
    fn test_range_arguments_expand_to_every_cell() {
        let cells = [("A1", 1.0), ("A2", 2.0), ("A3", 3.0), ("B2", 10.0)];
        assert_eq!(eval_with("sum(A1:A3)", &cells), 6.0);
        assert_eq!(eval_with("mean(A1:A3)", &cells), 2.0);
        assert_eq!(eval_with("sum(B3:A1)", &cells), 16.0);
        assert_eq!(eval_with("max(A1, B2, 4)", &cells), 10.0);
        assert_eq!(eval_with("min(A1:B3)", &cells), 0.0);
    }

    #[test]
    fn test_calls_combine_with_operators() {
        let cells = [("A1", 1.0), ("A2", 2.0)];
        assert_eq!(eval_with("sum(A1:A2) 2 *", &cells), 6.0);
        assert_eq!(eval_with("sum() 1 +", &cells), 1.0);
    }

    #[test]
    fn test_blank_formula_is_zero() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(evaluate(&Formula::default(), &registry, |_| 1.0), 0.0);
    }
}
