//! Workspace persistence and export formats.

mod csv;
mod md;
mod workspace;

pub use csv::{write_csv, write_csv_to};
pub use md::{write_markdown, write_markdown_to};
pub use workspace::{
    DEFAULT_SAVE_FILE, Workspace, WorkspaceFile, can_load, is_valid_workspace_name,
    parse_workspaces,
};

use gridcalc_engine::engine::{CellRef, Grid, format_value};

/// `(min_row, min_col, max_row, max_col)` over cells that have a formula,
/// or None for an empty grid.
pub(crate) fn used_bounds(grid: &Grid) -> Option<(usize, usize, usize, usize)> {
    grid.iter()
        .filter(|(_, cell)| !cell.formula.is_empty())
        .fold(None, |bounds, (r, _)| {
            let (min_row, min_col, max_row, max_col) =
                bounds.unwrap_or((r.row, r.col, r.row, r.col));
            Some((
                min_row.min(r.row),
                min_col.min(r.col),
                max_row.max(r.row),
                max_col.max(r.col),
            ))
        })
}

/// Display text of a cell in exports: two decimals, blank without a formula.
pub(crate) fn cell_display(grid: &Grid, row: usize, col: usize) -> String {
    let cell = CellRef::new(row, col);
    if grid.get_formula(cell).is_empty() {
        String::new()
    } else {
        format_value(grid.get_value(cell))
    }
}
