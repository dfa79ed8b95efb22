//! Key bindings for the grid view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::Mode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Move(i32, i32),
    EnterEdit,
    CommitEdit,
    Cancel,
    ClearCell,
    Undo,
    Redo,
    Save,
    Help,
    Back,
}

/// Translate a key press in the grid view. Keys with no binding return None;
/// in the text-entry modes they are handed to the line editor instead.
pub fn translate(mode: Mode, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match mode {
        Mode::Edit | Mode::NamePrompt => match key.code {
            KeyCode::Enter => Some(Action::CommitEdit),
            KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        Mode::Normal => match key.code {
            KeyCode::Char('z') if ctrl => Some(Action::Undo),
            KeyCode::Char('r') | KeyCode::Char('y') if ctrl => Some(Action::Redo),
            _ if ctrl => None,
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(-1, 0)),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(1, 0)),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(0, -1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(0, 1)),
            KeyCode::Enter | KeyCode::Char('e') => Some(Action::EnterEdit),
            KeyCode::Delete | KeyCode::Char('x') => Some(Action::ClearCell),
            KeyCode::Char('u') => Some(Action::Undo),
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('?') => Some(Action::Help),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Back),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_normal_mode_bindings() {
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('j'))), Some(Action::Move(0, 1)));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Left)), Some(Action::Move(-1, 0)));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('e'))), Some(Action::EnterEdit));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Delete)), Some(Action::ClearCell));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('?'))), Some(Action::Help));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('q'))), Some(Action::Back));
    }

    #[test]
    fn test_undo_redo_chords() {
        assert_eq!(translate(Mode::Normal, ctrl('z')), Some(Action::Undo));
        assert_eq!(translate(Mode::Normal, key(KeyCode::Char('u'))), Some(Action::Undo));
        assert_eq!(translate(Mode::Normal, ctrl('r')), Some(Action::Redo));
        assert_eq!(translate(Mode::Normal, ctrl('y')), Some(Action::Redo));
        assert_eq!(translate(Mode::Normal, ctrl('h')), None);
    }

    #[test]
    fn test_text_modes_only_bind_enter_and_escape() {
        assert_eq!(translate(Mode::Edit, key(KeyCode::Enter)), Some(Action::CommitEdit));
        assert_eq!(translate(Mode::NamePrompt, key(KeyCode::Esc)), Some(Action::Cancel));
        assert_eq!(translate(Mode::Edit, key(KeyCode::Char('q'))), None);
    }
}
