use crossterm::event::{self, KeyCode, KeyModifiers};

use super::app::{App, Mode};
use super::keymap::Action;

/// Handle text editing operations on a buffer with UTF-8 aware cursor movement.
fn handle_text_input(buffer: &mut String, cursor: &mut usize, key: event::KeyEvent) {
    match key.code {
        KeyCode::Left => {
            if *cursor > 0 {
                let mut new_pos = *cursor - 1;
                while new_pos > 0 && !buffer.is_char_boundary(new_pos) {
                    new_pos -= 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Right => {
            if *cursor < buffer.len() {
                let mut new_pos = *cursor + 1;
                while new_pos < buffer.len() && !buffer.is_char_boundary(new_pos) {
                    new_pos += 1;
                }
                *cursor = new_pos;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        KeyCode::Backspace => {
            if *cursor > 0 {
                let mut del_start = *cursor - 1;
                while del_start > 0 && !buffer.is_char_boundary(del_start) {
                    del_start -= 1;
                }
                buffer.drain(del_start..*cursor);
                *cursor = del_start;
            }
        }
        KeyCode::Delete => {
            if *cursor < buffer.len() {
                let mut del_end = *cursor + 1;
                while del_end < buffer.len() && !buffer.is_char_boundary(del_end) {
                    del_end += 1;
                }
                buffer.drain(*cursor..del_end);
            }
        }
        KeyCode::Char(c) => {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
        }
        _ => {}
    }
}

/// Result of applying an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// Apply a grid-view action to the application state.
pub fn apply_action(app: &mut App, action: Action) -> ApplyResult {
    match action {
        Action::Move(dx, dy) => app.move_cursor(dx, dy),
        Action::EnterEdit => app.enter_edit_mode(),
        Action::CommitEdit => match app.mode {
            Mode::Edit => app.commit_edit(),
            Mode::NamePrompt => app.commit_name_prompt(),
            Mode::Normal => {}
        },
        Action::Cancel => match app.mode {
            Mode::Edit => app.cancel_edit(),
            Mode::NamePrompt => app.cancel_name_prompt(),
            Mode::Normal => {}
        },
        Action::ClearCell => app.clear_current_cell(),
        Action::Undo => app.undo(),
        Action::Redo => app.redo(),
        Action::Save => app.save(),
        Action::Help => app.open_help_modal(),
        Action::Back => app.request_back(),
    }
    ApplyResult::Continue
}

/// Feed an unbound key to whichever line editor is active.
pub fn handle_text(app: &mut App, key: event::KeyEvent) {
    match app.mode {
        Mode::Edit => handle_text_input(&mut app.edit_buffer, &mut app.edit_cursor, key),
        Mode::NamePrompt => handle_text_input(&mut app.name_buffer, &mut app.name_cursor, key),
        Mode::Normal => {}
    }
}
