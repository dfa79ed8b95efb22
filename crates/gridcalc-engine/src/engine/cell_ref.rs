//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between formula-style cell references
//! (e.g., "A1", "c7") and 1-based row/column coordinates, plus the dense
//! slot index used by the grid.
//!
//! The reference grammar is exactly one letter followed by exactly one digit,
//! so columns A-Z and rows 1-9 are the only addressable cells. Grids with more
//! rows than that can be created in principle, but rows past 9 could never be
//! referenced from a formula; [`crate::engine::Grid::new`] refuses them.
//!
//! # Examples
//!
//! ```ignore
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 2);  // 1-based
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Highest column a reference letter can name (`Z`).
pub const MAX_COLUMNS: usize = 26;

/// Highest row a single reference digit can name.
pub const MAX_REFERENCE_ROW: usize = 9;

/// A reference to a cell by row and column (both 1-based).
///
/// Ordering is row-major, which is also the order ranges expand in.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference such as "A1" or "z9".
    /// Returns None if the input is not a single letter plus a non-zero digit.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        let caps = reference_re().captures(name.trim())?;
        let letter = caps["letter"].as_bytes()[0];
        let digit = caps["digit"].as_bytes()[0];
        let cell = CellRef::from_ascii(letter, digit);
        (cell.row >= 1).then_some(cell)
    }

    /// Build a reference from its two source characters. The row may be 0,
    /// which is never in bounds; callers bounds-check before indexing.
    pub(crate) fn from_ascii(letter: u8, digit: u8) -> CellRef {
        let col = (letter.to_ascii_uppercase() - b'A') as usize + 1;
        let row = (digit - b'0') as usize;
        CellRef::new(row, col)
    }

    /// Convert a 1-based column to its letter (1 -> A, 26 -> Z).
    /// Columns outside 1..=26 render as `?`.
    pub fn col_to_letter(col: usize) -> char {
        if (1..=MAX_COLUMNS).contains(&col) {
            (b'A' + (col - 1) as u8) as char
        } else {
            '?'
        }
    }

    /// Whether this reference addresses a cell of a `rows` x `columns` grid.
    pub fn in_bounds(&self, rows: usize, columns: usize) -> bool {
        (1..=rows).contains(&self.row) && (1..=columns).contains(&self.col)
    }

    /// Dense slot index: `(col - 1) + (row - 1) * columns`.
    /// The reference must be in bounds.
    pub fn index(&self, columns: usize) -> usize {
        (self.col - 1) + (self.row - 1) * columns
    }

    /// Inverse of [`CellRef::index`].
    pub fn from_index(index: usize, columns: usize) -> CellRef {
        CellRef::new(index / columns + 1, index % columns + 1)
    }
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letter>[A-Za-z])(?<digit>[0-9])$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::from_str(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col), self.row)
    }
}
