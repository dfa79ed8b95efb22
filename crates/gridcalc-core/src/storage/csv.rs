//! CSV export of computed values

use crate::error::Result;
use gridcalc_engine::engine::Grid;
use std::io::Write;
use std::path::Path;

/// Export the used part of the grid to CSV using computed display values.
pub fn write_csv(path: &Path, grid: &Grid) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_csv_to(&mut file, grid)
}

/// Write CSV rows to any writer. An empty grid writes nothing.
///
/// Fields are formatted values (digits, sign, point, `#NAN!`/`#INF!` or
/// blank), which never need quoting.
pub fn write_csv_to<W: Write>(out: &mut W, grid: &Grid) -> Result<()> {
    let Some((min_row, min_col, max_row, max_col)) = super::used_bounds(grid) else {
        return Ok(());
    };

    for row in min_row..=max_row {
        let row_fields: Vec<String> = (min_col..=max_col)
            .map(|col| super::cell_display(grid, row, col))
            .collect();
        writeln!(out, "{}", row_fields.join(","))?;
    }

    Ok(())
}
