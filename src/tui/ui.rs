//! UI rendering

use super::app::{App, Mode, Screen};
use super::help::{get_functions_help, get_help_text};
use gridcalc_core::CellRef;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 5;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 3;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Number of grid columns that fit in `width` terminal cells.
pub(crate) fn visible_columns(width: u16, column_width: usize) -> usize {
    let available = width.saturating_sub(ROW_HEADER_WIDTH + GRID_COLUMN_SPACING + 2) as usize;
    (available / (column_width + GRID_COLUMN_SPACING as usize)).max(1)
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Menu => draw_menu(f, app),
        Screen::Grid => draw_grid_screen(f, app),
    }

    if let Some(picker) = app.picker.as_ref() {
        draw_picker(f, &picker.names, picker.selected);
    }
    if app.help_modal {
        draw_help_modal(f, app);
    }
    if let Some(confirm) = app.confirm.as_ref() {
        draw_confirm(f, &confirm.question());
    }
}

fn draw_menu(f: &mut Frame, app: &App) {
    let area = centered_rect(40, 50, f.area());
    let items: Vec<ListItem> = app
        .menu_items()
        .into_iter()
        .map(|item| ListItem::new(item.label()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Gridcalc "))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.menu_selected));
    f.render_stateful_widget(list, area, &mut state);

    if !app.status_message.is_empty() {
        let [_, _, status_area] = split_main_chunks(f.area());
        draw_status_bar(f, app, status_area);
    }
}

fn draw_grid_screen(f: &mut Frame, app: &mut App) {
    let chunks = split_main_chunks(f.area());

    // Update visible dimensions based on actual size
    let grid_area = chunks[1];
    app.visible_cols = visible_columns(grid_area.width, app.config.column_width);
    app.visible_rows = (grid_area.height.saturating_sub(3) as usize).max(1); // header + borders
    app.update_viewport();

    draw_formula_bar(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let cell_ref = app.current_cell_ref();

    let content = match app.mode {
        Mode::Edit => {
            // Insert cursor marker at cursor position
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor);
            format!("{}: {}│{}", cell_ref, before, after)
        }
        Mode::NamePrompt => {
            let (before, after) = app.name_buffer.split_at(app.name_cursor);
            format!("Save as: {}│{}", before, after)
        }
        Mode::Normal => {
            let formula = app.doc.get_formula(cell_ref);
            if formula.is_empty() {
                format!("{}: (empty)", cell_ref)
            } else {
                format!("{}: {}", cell_ref, formula)
            }
        }
    };

    let title = match app.mode {
        Mode::Edit => " Edit ",
        Mode::NamePrompt => " Workspace name ",
        Mode::Normal => " Cell ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(match app.mode {
            Mode::Edit => Color::Yellow,
            Mode::NamePrompt => Color::Cyan,
            Mode::Normal => Color::White,
        }));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn header_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let last_col = (app.viewport_col + app.visible_cols).min(app.doc.columns());
    let last_row = (app.viewport_row + app.visible_rows).min(app.doc.rows());

    let mut header_cells = vec![Cell::from(" ")]; // Corner
    for col in app.viewport_col..last_col {
        let name = CellRef::col_to_letter(col + 1).to_string();
        header_cells.push(Cell::from(name).style(header_style(col == app.cursor_col)));
    }
    let header = Row::new(header_cells).height(1);

    // Every visible cell is re-queried on each frame.
    let mut rows = Vec::new();
    for row in app.viewport_row..last_row {
        let mut cells = vec![
            Cell::from(format!("{:>2}", row + 1)).style(header_style(row == app.cursor_row)),
        ];
        for col in app.viewport_col..last_col {
            let cell_ref = CellRef::new(row + 1, col + 1);
            let display = app.doc.display(cell_ref);
            let text = format!("{:>width$}", display, width = app.config.column_width);

            let style = if row == app.cursor_row && col == app.cursor_col {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if display.starts_with('#') {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            cells.push(Cell::from(text).style(style));
        }
        rows.push(Row::new(cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend(
        (app.viewport_col..last_col).map(|_| Constraint::Length(app.config.column_width as u16)),
    );

    let title = match app.doc.workspace.as_deref() {
        Some(name) if app.doc.modified => format!(" {} [+] ", name),
        Some(name) => format!(" {} ", name),
        None if app.doc.modified => " [untitled] [+] ".to_string(),
        None => " [untitled] ".to_string(),
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);

    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_message.starts_with("Error:") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let text = if app.status_message.is_empty() && app.screen == Screen::Grid {
        "? help  e edit  x clear  u undo  s save  q menu".to_string()
    } else {
        app.status_message.clone()
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn modal_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().fg(Color::White).bg(Color::Black))
}

fn draw_picker(f: &mut Frame, names: &[String], selected: usize) {
    let area = centered_rect(50, 60, f.area());
    let items: Vec<ListItem> = names.iter().map(|n| ListItem::new(n.as_str())).collect();
    let list = List::new(items)
        .block(modal_block(" Load workspace "))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm(f: &mut Frame, question: &str) {
    let area = centered_rect(50, 20, f.area());
    let paragraph = Paragraph::new(question)
        .block(modal_block(" Confirm "))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Lines shown in the help modal: key bindings in the grid view, then the
/// formula and function reference.
pub(crate) fn help_lines(app: &App) -> Vec<String> {
    let mut lines = Vec::new();
    if app.screen == Screen::Grid {
        lines.extend(get_help_text());
        lines.push(String::new());
    }
    lines.extend(get_functions_help(app.doc.grid.registry()));
    lines.push(String::new());
    lines.push("Press Esc or q to close".to_string());
    lines
}

fn draw_help_modal(f: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, f.area());
    let title = if app.screen == Screen::Grid {
        " Help "
    } else {
        " Functions "
    };

    let lines: Vec<Line> = help_lines(app)
        .into_iter()
        .map(|text| {
            if text.ends_with(':') || text == "Formulas" {
                Line::from(Span::styled(
                    text,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(text)
            }
        })
        .collect();

    let viewport_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(viewport_height);
    let effective_scroll = app.help_scroll.min(max_scroll);
    let scroll_y = u16::try_from(effective_scroll).unwrap_or(u16::MAX);

    let paragraph = Paragraph::new(lines)
        .block(modal_block(title))
        .scroll((scroll_y, 0))
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{Terminal, backend::TestBackend};

    fn grid_app() -> App {
        let mut app = App::new(Config {
            save_file: "/nonexistent/save.xml".into(),
            ..Config::default()
        })
        .unwrap();
        app.new_workspace();
        app
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_visible_columns_fit_width() {
        assert_eq!(visible_columns(80, 10), 6);
        assert_eq!(visible_columns(5, 10), 1);
    }

    #[test]
    fn test_grid_shows_values_and_blanks() {
        let mut app = grid_app();
        app.doc.set_formula(CellRef::new(1, 1), "5").unwrap();
        app.doc.set_formula(CellRef::new(1, 2), "A1 2 /").unwrap();
        let screen = render(&mut app, 80, 16);
        assert!(screen.contains("5.00"));
        assert!(screen.contains("2.50"));
        assert!(screen.contains("A1: 5"));
        assert!(!screen.contains("0.00"));
    }

    #[test]
    fn test_draw_sizes_viewport_to_terminal() {
        let mut app = grid_app();
        render(&mut app, 40, 12);
        assert_eq!(app.visible_cols, visible_columns(40, app.config.column_width));
        // 12 lines: formula bar 3, status 1, grid 8 minus header and borders
        assert_eq!(app.visible_rows, 5);
    }

    #[test]
    fn test_menu_help_lists_functions_only() {
        let mut app = grid_app();
        app.screen = Screen::Menu;
        let lines = help_lines(&app);
        assert!(!lines.iter().any(|l| l.starts_with("Navigation")));
        assert!(lines.iter().any(|l| l.contains("sum(...)")));
    }
}
