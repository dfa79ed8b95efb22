//! Linear undo/redo history.
//!
//! One vector of edit records plus a cursor: records before the cursor can be
//! undone, records from the cursor on can be redone. Recording a new edit
//! truncates the log to the cursor first, so there is never a redo branch.

use super::EngineError;

/// Default number of records kept before the oldest is dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// One committed formula change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRecord {
    pub old_formula: String,
    pub new_formula: String,
    /// Slot index of the edited cell.
    pub cell: usize,
}

#[derive(Clone, Debug)]
pub struct History {
    records: Vec<EditRecord>,
    cursor: usize,
    /// 0 means unbounded.
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        History::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// An unbounded history.
    pub fn new() -> Self {
        History::with_limit(0)
    }

    pub fn with_limit(limit: usize) -> Self {
        History {
            records: Vec::new(),
            cursor: 0,
            limit,
        }
    }

    /// Append a record after the cursor, discarding any redoable records.
    pub fn record(&mut self, old_formula: String, new_formula: String, cell: usize) {
        self.records.truncate(self.cursor);
        self.records.push(EditRecord {
            old_formula,
            new_formula,
            cell,
        });
        if self.limit > 0 && self.records.len() > self.limit {
            self.records.remove(0);
        }
        self.cursor = self.records.len();
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// The record the next [`History::undo`] would return.
    pub fn undo_entry(&self) -> Option<&EditRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// The record the next [`History::redo`] would return.
    pub fn redo_entry(&self) -> Option<&EditRecord> {
        self.records.get(self.cursor)
    }

    /// Step back: returns the formula to restore and the cell to restore it in.
    pub fn undo(&mut self) -> Result<(String, usize), EngineError> {
        let record = self.undo_entry().ok_or(EngineError::NothingToUndo)?;
        let restore = (record.old_formula.clone(), record.cell);
        self.cursor -= 1;
        Ok(restore)
    }

    /// Step forward: returns the formula to reapply and its cell.
    pub fn redo(&mut self) -> Result<(String, usize), EngineError> {
        let record = self.redo_entry().ok_or(EngineError::NothingToRedo)?;
        let reapply = (record.new_formula.clone(), record.cell);
        self.cursor += 1;
        Ok(reapply)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
