//! Application state and logic.
//!
//! [`App`] owns the [`Document`] being edited plus everything the terminal UI
//! needs around it: which [`Screen`] is showing, the cursor, the edit and
//! name buffers, and the overlays (help listing, workspace picker,
//! confirmation).

use crate::config::Config;
use gridcalc_core::storage::{WorkspaceFile, can_load, is_valid_workspace_name};
use gridcalc_core::{CellRef, Document, GridcalcError};
use std::path::PathBuf;

/// Top-level screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Grid,
}

/// Input mode while the grid is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Move around the grid, single-key commands.
    Normal,
    /// Edit the formula of the current cell.
    Edit,
    /// Type a workspace name to save under.
    NamePrompt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    New,
    Load,
    Functions,
    Quit,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::New => "New workspace",
            MenuItem::Load => "Load workspace",
            MenuItem::Functions => "Functions",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Pending yes/no question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirm {
    /// Leave the grid, discarding unsaved edits.
    Discard,
    /// Load the named workspace.
    Load(String),
}

impl Confirm {
    pub fn question(&self) -> String {
        match self {
            Confirm::Discard => "Discard unsaved changes? (y/n)".to_string(),
            Confirm::Load(name) => format!("Load workspace {}? (y/n)", name),
        }
    }
}

/// Workspaces found in the save file.
#[derive(Clone, Debug, Default)]
pub struct WorkspacePicker {
    pub names: Vec<String>,
    pub selected: usize,
}

pub struct App {
    pub doc: Document,
    pub config: Config,
    /// XML file workspaces are loaded from and saved to
    pub save_file: PathBuf,
    pub screen: Screen,
    pub mode: Mode,
    pub menu_selected: usize,
    /// Cursor position (0-based column)
    pub cursor_col: usize,
    /// Cursor position (0-based row)
    pub cursor_row: usize,
    /// First column shown in the grid view
    pub viewport_col: usize,
    /// First row shown in the grid view
    pub viewport_row: usize,
    pub visible_cols: usize,
    pub visible_rows: usize,
    /// Edit buffer for cell editing
    pub edit_buffer: String,
    /// Cursor position within edit buffer (byte offset)
    pub edit_cursor: usize,
    pub name_buffer: String,
    pub name_cursor: usize,
    pub status_message: String,
    pub help_modal: bool,
    pub help_scroll: usize,
    pub picker: Option<WorkspacePicker>,
    pub confirm: Option<Confirm>,
}

impl App {
    /// Create the app on the main menu with an empty document sized by
    /// `config`.
    pub fn new(config: Config) -> gridcalc_core::Result<Self> {
        let doc = Document::new(config.rows, config.columns, config.history_limit)?;
        Ok(App {
            doc,
            save_file: config.save_file.clone(),
            config,
            screen: Screen::Menu,
            mode: Mode::Normal,
            menu_selected: 0,
            cursor_col: 0,
            cursor_row: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 8,
            visible_rows: 9,
            edit_buffer: String::new(),
            edit_cursor: 0,
            name_buffer: String::new(),
            name_cursor: 0,
            status_message: String::new(),
            help_modal: false,
            help_scroll: 0,
            picker: None,
            confirm: None,
        })
    }

    pub fn current_cell_ref(&self) -> CellRef {
        CellRef::new(self.cursor_row + 1, self.cursor_col + 1)
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.status_message = format!("Error: {}", err);
    }

    // Menu

    /// Menu entries. Load is only offered when the save file holds a
    /// workspace.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = vec![MenuItem::New];
        if can_load(&self.save_file) {
            items.push(MenuItem::Load);
        }
        items.push(MenuItem::Functions);
        items.push(MenuItem::Quit);
        items
    }

    pub fn move_menu(&mut self, delta: i32) {
        let len = self.menu_items().len();
        let selected = self.menu_selected as i32 + delta;
        self.menu_selected = selected.clamp(0, len as i32 - 1) as usize;
    }

    /// Activate the selected menu entry. Returns true to quit.
    pub fn activate_menu(&mut self) -> bool {
        let items = self.menu_items();
        let Some(item) = items.get(self.menu_selected.min(items.len() - 1)).copied() else {
            return false;
        };
        match item {
            MenuItem::New => self.new_workspace(),
            MenuItem::Load => self.open_picker(),
            MenuItem::Functions => self.open_help_modal(),
            MenuItem::Quit => return true,
        }
        false
    }

    pub fn new_workspace(&mut self) {
        match Document::new(self.config.rows, self.config.columns, self.config.history_limit) {
            Ok(doc) => {
                self.doc = doc;
                self.enter_grid();
                self.status_message = "New workspace".to_string();
            }
            Err(e) => self.set_error(e),
        }
    }

    fn enter_grid(&mut self) {
        self.screen = Screen::Grid;
        self.mode = Mode::Normal;
        self.cursor_col = 0;
        self.cursor_row = 0;
        self.viewport_col = 0;
        self.viewport_row = 0;
    }

    // Workspace picker

    pub fn open_picker(&mut self) {
        match WorkspaceFile::open(&self.save_file) {
            Ok(file) if !file.is_empty() => {
                self.picker = Some(WorkspacePicker {
                    names: file.names().map(str::to_string).collect(),
                    selected: 0,
                });
            }
            Ok(_) => self.status_message = "No saved workspaces".to_string(),
            Err(e) => self.set_error(e),
        }
    }

    pub fn move_picker(&mut self, delta: i32) {
        if let Some(picker) = self.picker.as_mut() {
            let last = picker.names.len().saturating_sub(1) as i32;
            picker.selected = (picker.selected as i32 + delta).clamp(0, last) as usize;
        }
    }

    /// Ask for confirmation before loading the picked workspace.
    pub fn pick_workspace(&mut self) {
        if let Some(picker) = self.picker.as_ref()
            && let Some(name) = picker.names.get(picker.selected)
        {
            self.confirm = Some(Confirm::Load(name.clone()));
        }
    }

    pub fn load_workspace(&mut self, name: &str) {
        let doc = Document::new(self.config.rows, self.config.columns, self.config.history_limit);
        let mut doc = match doc {
            Ok(doc) => doc,
            Err(e) => return self.set_error(e),
        };
        match doc.load_workspace(&self.save_file, name) {
            Ok(report) => {
                self.doc = doc;
                self.picker = None;
                self.enter_grid();
                self.status_message = if report.skipped == 0 {
                    format!("Loaded {} ({} cells)", name, report.loaded)
                } else {
                    format!(
                        "Loaded {} ({} cells, {} skipped)",
                        name, report.loaded, report.skipped
                    )
                };
            }
            Err(e) => self.set_error(e),
        }
    }

    // Confirmation

    /// Answer the pending question.
    pub fn answer_confirm(&mut self, yes: bool) {
        let Some(confirm) = self.confirm.take() else {
            return;
        };
        if !yes {
            return;
        }
        match confirm {
            Confirm::Discard => self.back_to_menu(),
            Confirm::Load(name) => self.load_workspace(&name),
        }
    }

    /// Leave the grid. Asks first if there are unsaved edits.
    pub fn request_back(&mut self) {
        if self.doc.modified {
            self.confirm = Some(Confirm::Discard);
        } else {
            self.back_to_menu();
        }
    }

    fn back_to_menu(&mut self) {
        self.screen = Screen::Menu;
        self.mode = Mode::Normal;
        self.menu_selected = 0;
        self.status_message.clear();
    }

    // Grid navigation

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let max_col = self.doc.columns().saturating_sub(1) as i32;
        let max_row = self.doc.rows().saturating_sub(1) as i32;
        self.cursor_col = (self.cursor_col as i32 + dx).clamp(0, max_col) as usize;
        self.cursor_row = (self.cursor_row as i32 + dy).clamp(0, max_row) as usize;
        self.update_viewport();
    }

    /// Scroll so the cursor stays visible.
    pub fn update_viewport(&mut self) {
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + self.visible_cols {
            self.viewport_col = self.cursor_col + 1 - self.visible_cols;
        }
        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + self.visible_rows {
            self.viewport_row = self.cursor_row + 1 - self.visible_rows;
        }
    }

    // Editing

    /// Start editing the current cell with its formula in the buffer.
    pub fn enter_edit_mode(&mut self) {
        self.edit_buffer = self.doc.get_formula(self.current_cell_ref()).to_string();
        self.edit_cursor = self.edit_buffer.len();
        self.mode = Mode::Edit;
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
    }

    /// Commit the edit buffer. A rejected formula keeps the editor open so
    /// the user can fix it.
    pub fn commit_edit(&mut self) {
        let cell = self.current_cell_ref();
        let input = std::mem::take(&mut self.edit_buffer);
        match self.doc.set_formula(cell, &input) {
            Ok(()) => {
                self.mode = Mode::Normal;
                self.edit_cursor = 0;
                self.report_change("Set", cell);
            }
            Err(e) => {
                self.edit_buffer = input;
                self.set_error(e);
            }
        }
    }

    pub fn clear_current_cell(&mut self) {
        let cell = self.current_cell_ref();
        match self.doc.clear_cell(cell) {
            Ok(()) => self.report_change("Cleared", cell),
            Err(e) => self.set_error(e),
        }
    }

    pub fn undo(&mut self) {
        match self.doc.undo() {
            Ok(cell) => self.report_change("Undo", cell),
            Err(e) => self.set_error(e),
        }
    }

    pub fn redo(&mut self) {
        match self.doc.redo() {
            Ok(cell) => self.report_change("Redo", cell),
            Err(e) => self.set_error(e),
        }
    }

    fn report_change(&mut self, what: &str, cell: CellRef) {
        let recomputed = self.doc.changed_by(cell).len() - 1;
        self.status_message = match recomputed {
            0 => format!("{} {}", what, cell),
            n => format!("{} {} ({} dependent cells updated)", what, cell, n),
        };
    }

    // Saving

    /// Save under the current workspace name, or ask for one.
    pub fn save(&mut self) {
        match self.doc.workspace.clone() {
            Some(name) => self.save_as(&name),
            None => self.open_name_prompt(),
        }
    }

    pub fn open_name_prompt(&mut self) {
        self.mode = Mode::NamePrompt;
        self.name_buffer.clear();
        self.name_cursor = 0;
    }

    pub fn cancel_name_prompt(&mut self) {
        self.mode = Mode::Normal;
        self.name_buffer.clear();
        self.name_cursor = 0;
    }

    pub fn commit_name_prompt(&mut self) {
        let name = self.name_buffer.trim().to_string();
        if !is_valid_workspace_name(&name) {
            self.set_error(GridcalcError::InvalidWorkspaceName(name));
            return;
        }
        self.cancel_name_prompt();
        self.save_as(&name);
    }

    fn save_as(&mut self, name: &str) {
        match self.doc.save_workspace(&self.save_file, Some(name)) {
            Ok(name) => {
                self.status_message = format!("Saved {} to {}", name, self.save_file.display())
            }
            Err(e) => self.set_error(e),
        }
    }

    // Help

    pub fn open_help_modal(&mut self) {
        self.help_modal = true;
        self.help_scroll = 0;
    }

    pub fn close_help_modal(&mut self) {
        self.help_modal = false;
    }

    pub fn scroll_help_by(&mut self, delta: i32) {
        let next = self.help_scroll as i64 + delta as i64;
        self.help_scroll = next.max(0) as usize;
    }
}
