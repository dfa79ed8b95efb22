//! Markdown export functionality

use crate::error::Result;
use gridcalc_engine::engine::{CellRef, Grid};
use std::io::Write;
use std::path::Path;

/// Write the grid to a markdown file
pub fn write_markdown(path: &Path, grid: &Grid, title: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_markdown_to(&mut file, grid, title)
}

pub fn write_markdown_to<W: Write>(out: &mut W, grid: &Grid, title: &str) -> Result<()> {
    writeln!(out, "# {}", title)?;
    writeln!(out)?;

    let Some((min_row, min_col, max_row, max_col)) = super::used_bounds(grid) else {
        writeln!(out, "*Empty spreadsheet*")?;
        return Ok(());
    };

    // Header with column letters
    write!(out, "|   |")?;
    for col in min_col..=max_col {
        write!(out, " {} |", CellRef::col_to_letter(col))?;
    }
    writeln!(out)?;

    write!(out, "|---|")?;
    for _ in min_col..=max_col {
        write!(out, "---:|")?;
    }
    writeln!(out)?;

    for row in min_row..=max_row {
        write!(out, "| {} |", row)?;
        for col in min_col..=max_col {
            write!(out, " {} |", escape_markdown(&super::cell_display(grid, row, col)))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markdown_of(grid: &Grid) -> String {
        let mut out = Vec::new();
        write_markdown_to(&mut out, grid, "Budget").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_markdown_table() {
        let mut grid = Grid::default();
        grid.set_formula(CellRef::new(1, 1), "1", None).unwrap();
        grid.set_formula(CellRef::new(2, 2), "sum(A1:A2)", None).unwrap();

        assert_eq!(
            markdown_of(&grid),
            "# Budget\n\n|   | A | B |\n|---|---:|---:|\n| 1 | 1.00 |  |\n| 2 |  | 1.00 |\n"
        );
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(markdown_of(&Grid::default()), "# Budget\n\n*Empty spreadsheet*\n");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a|b"), "a\\|b");
    }
}
