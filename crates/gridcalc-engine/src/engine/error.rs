//! Error types for the cell engine.
//!
//! Every error here is recoverable: an operation that returns one has left
//! the grid and the edit history exactly as they were.

use thiserror::Error;

use super::CellRef;

/// Why a formula was rejected by the validator.
///
/// Positions are 1-based character columns into the formula text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("malformed number at position {pos}")]
    MalformedNumber { pos: usize },

    #[error("'{name}' at position {pos} is neither a cell reference nor a function call")]
    UnknownIdentifier { name: String, pos: usize },

    #[error("reference at position {pos} has more than one row digit (only rows 1-9 can be referenced)")]
    RowNotAddressable { pos: usize },

    #[error("call to {name}() is missing its closing parenthesis")]
    UnterminatedCall { name: String },

    #[error("empty argument in call to {name}() at position {pos}")]
    EmptyArgument { name: String, pos: usize },

    #[error("argument at position {pos} of {name}() must be a number, a reference or a range")]
    InvalidArgument { name: String, pos: usize },

    #[error("a range must be the only argument of {name}()")]
    MixedArguments { name: String },

    #[error("operator '{op}' at position {pos} is missing an operand")]
    MissingOperand { op: char, pos: usize },

    #[error("{count} value(s) left without an operator")]
    LeftoverOperands { count: usize },

    #[error("formula has no value")]
    NoValue,

    #[error("reference {reference} is outside the {rows}x{columns} grid")]
    OutOfBounds {
        reference: CellRef,
        rows: usize,
        columns: usize,
    },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },
}

impl FormulaError {
    /// Bounds errors name something that does not exist (a cell outside the
    /// grid, an unregistered function); the rest are syntax errors.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            FormulaError::OutOfBounds { .. } | FormulaError::UnknownFunction { .. }
        )
    }
}

/// Errors returned by grid and history operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("Circular dependency: {cell} cannot reference {via}")]
    CircularDependency { cell: CellRef, via: CellRef },

    #[error("Cell {cell} is outside the {rows}x{columns} grid")]
    OutOfGrid {
        cell: CellRef,
        rows: usize,
        columns: usize,
    },

    #[error("Invalid grid size {rows}x{columns}: {reason}")]
    InvalidDimensions {
        rows: usize,
        columns: usize,
        reason: &'static str,
    },

    #[error("Invalid function name '{0}'")]
    InvalidFunctionName(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
