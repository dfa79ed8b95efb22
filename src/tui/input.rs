use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::io;

use super::actions::{ApplyResult, apply_action, handle_text};
use super::app::{App, Screen};
use super::keymap::translate;
use super::ui;

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Only process key press events (Windows reports Press + Release)
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(app, key) == ApplyResult::Quit {
                return Ok(());
            }
        }
    }
}

/// Route one key press to whichever layer has focus: confirmation, help,
/// picker, then the current screen.
pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    if app.confirm.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_confirm(false),
            _ => {}
        }
        return ApplyResult::Continue;
    }

    if app.help_modal {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.close_help_modal(),
            KeyCode::Down | KeyCode::Char('j') => app.scroll_help_by(1),
            KeyCode::Up | KeyCode::Char('k') => app.scroll_help_by(-1),
            KeyCode::PageDown => app.scroll_help_by(12),
            KeyCode::PageUp => app.scroll_help_by(-12),
            _ => {}
        }
        return ApplyResult::Continue;
    }

    if app.picker.is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.picker = None,
            KeyCode::Down | KeyCode::Char('j') => app.move_picker(1),
            KeyCode::Up | KeyCode::Char('k') => app.move_picker(-1),
            KeyCode::Enter => app.pick_workspace(),
            _ => {}
        }
        return ApplyResult::Continue;
    }

    match app.screen {
        Screen::Menu => handle_menu_key(app, key),
        Screen::Grid => match translate(app.mode, key) {
            Some(action) => apply_action(app, action),
            None => {
                handle_text(app, key);
                ApplyResult::Continue
            }
        },
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) -> ApplyResult {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return ApplyResult::Quit;
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_menu(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_menu(-1),
        KeyCode::Enter => {
            if app.activate_menu() {
                return ApplyResult::Quit;
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => return ApplyResult::Quit,
        _ => {}
    }
    ApplyResult::Continue
}
