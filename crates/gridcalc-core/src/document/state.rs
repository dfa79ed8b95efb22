use crate::error::Result;
use gridcalc_engine::engine::{Grid, History};

/// UI-agnostic document state for one workspace session.
#[derive(Debug)]
pub struct Document {
    /// The cell grid
    pub grid: Grid,
    /// Undo/redo log for edits made through the document
    pub history: History,
    /// Name the workspace was loaded from or last saved as
    pub workspace: Option<String>,
    /// Whether the grid has changed since the last load or save
    pub modified: bool,
}

impl Document {
    /// Create an empty document.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new(rows: usize, columns: usize, history_limit: usize) -> Result<Self> {
        Ok(Document {
            grid: Grid::new(rows, columns)?,
            history: History::with_limit(history_limit),
            workspace: None,
            modified: false,
        })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document {
            grid: Grid::default(),
            history: History::default(),
            workspace: None,
            modified: false,
        }
    }
}
