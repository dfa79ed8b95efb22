//! Terminal UI: main menu, grid view, workspace picker and help.

mod actions;
mod app;
mod help;
mod input;
mod keymap;
mod ui;

pub use app::App;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io;

/// Take over the terminal and run the UI until the user quits. The terminal
/// is restored even when the event loop fails.
pub fn run(app: &mut App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .and_then(|mut terminal| {
            let res = input::run_app(&mut terminal, app);
            let _ = terminal.show_cursor();
            res
        });

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    log::debug!("terminal restored");
    result
}
