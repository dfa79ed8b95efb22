//! Spreadsheet engine API.
//!
//! This module provides the cell engine:
//!
//! - [`Grid`], [`Cell`] - Dense cell storage, dependency graph and propagation
//! - [`CellRef`] - Cell reference parsing (A1 notation <-> row/col)
//! - [`validate`], [`parse_formula`] - The formula tokenizer and validator
//! - [`evaluate`] - Value stack evaluation of a parsed formula
//! - [`would_create_cycle`] - Circular dependency detection
//! - [`extract_dependencies`] - Cells a formula reads
//! - [`History`] - Linear undo/redo log
//! - [`format_value`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod error;
mod eval;
mod format;
mod formula;
mod grid;
mod history;

pub use cell::Cell;
pub use cell_ref::{CellRef, MAX_COLUMNS, MAX_REFERENCE_ROW};
pub use cycle::would_create_cycle;
pub use deps::{expand_range, extract_dependencies};
pub use error::{EngineError, FormulaError};
pub use eval::evaluate;
pub use format::{format_number, format_value};
pub use formula::{Argument, Formula, Operator, Token, parse_formula, validate};
pub use grid::{CellEntry, DEFAULT_COLUMNS, DEFAULT_ROWS, Grid, MAX_CELLS};
pub use history::{DEFAULT_HISTORY_LIMIT, EditRecord, History};

pub use crate::builtins::{BUILTINS, Builtin, FunctionRegistry, NativeFn};
