use crate::application::{App, AppMode, MenuItem};
use crate::domain::CellAddress;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
};

pub const COLUMN_WIDTH: u16 = 10;
const ROW_HEADER_WIDTH: u16 = 5;

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    update_viewport(app, chunks[1]);

    render_header(f, app, chunks[0]);
    render_grid(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::Menu => render_menu(f, app),
        AppMode::Help => render_help_popup(f, app.help_scroll),
        _ => {}
    }
}

/// Derives how many rows and columns fit inside the bordered table.
fn update_viewport(app: &mut App, area: Rect) {
    // Borders take two lines/columns, the header row one more line.
    let rows = area.height.saturating_sub(3) as usize;
    let usable = area.width.saturating_sub(2 + ROW_HEADER_WIDTH) as usize;
    let cols = usable / (COLUMN_WIDTH as usize + 1);
    app.update_viewport_size(rows, cols);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "gridsheet | Cell: {} | {}x{} | Value: {}",
        app.selected_address(),
        app.grid.rows(),
        app.grid.cols(),
        app.selected_value()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let last_row = (app.scroll_row + app.viewport_rows).min(app.grid.rows());
    let last_col = (app.scroll_col + app.viewport_cols).min(app.grid.cols());

    let mut headers = vec![Cell::from("")];
    for col in app.scroll_col..last_col {
        headers.push(
            Cell::from(CellAddress::column_label(col))
                .style(header_style(col == app.selected_col)),
        );
    }

    let mut rows = vec![Row::new(headers).height(1)];
    for row in app.scroll_row..last_row {
        let mut cells =
            vec![Cell::from(format!("{}", row + 1)).style(header_style(row == app.selected_row))];

        for col in app.scroll_col..last_col {
            let value = app.grid.lookup(row, col).unwrap_or("");
            let style = if row == app.selected_row && col == app.selected_col {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            cells.push(Cell::from(value.to_string()).style(style));
        }

        rows.push(Row::new(cells).height(1));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend((app.scroll_col..last_col).map(|_| Constraint::Length(COLUMN_WIDTH)));

    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Grid"))
        .column_spacing(1);

    f.render_widget(table, area);
}

fn header_style(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::LightBlue).fg(Color::Black)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.mode {
        AppMode::Normal | AppMode::Menu => match &app.status_message {
            Some(status) => status.clone(),
            None => {
                let filename = app.filename.as_deref().unwrap_or("unsaved");
                format!(
                    "File: {} | m: menu | s/S: sort col/row | Ctrl+S: save | Ctrl+O: load \
                     | F1/?: help | q: quit",
                    filename
                )
            }
        },
        AppMode::Editing => format!(
            "Editing {}: {} (Enter to save, Esc to cancel)",
            app.selected_address(),
            app.input
        ),
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveAs => {
            format!("Save as: {} (Enter to save, Esc to cancel)", app.filename_input)
        }
        AppMode::LoadFile => {
            format!("Load file: {} (Enter to load, Esc to cancel)", app.filename_input)
        }
        AppMode::ExportCsv => {
            format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input)
        }
        AppMode::ImportCsv => format!(
            "Import CSV from: {} (Enter to import, Esc to cancel)",
            app.filename_input
        ),
    };

    let style = match app.mode {
        AppMode::Normal | AppMode::Menu => Style::default(),
        AppMode::Editing => Style::default().fg(Color::Green),
        AppMode::Help => Style::default().fg(Color::Cyan),
        AppMode::SaveAs | AppMode::LoadFile => Style::default().fg(Color::Yellow),
        AppMode::ExportCsv | AppMode::ImportCsv => Style::default().fg(Color::Magenta),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_menu(f: &mut Frame, app: &App) {
    let area = f.area();
    let height = MenuItem::ALL.len() as u16 + 2;
    let popup_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: 20.min(area.width.saturating_sub(1)),
        height: height.min(area.height.saturating_sub(1)),
    };

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| ListItem::new(item.label()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu"))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.menu_index));

    f.render_widget(Clear, popup_area);
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let help_widget = Paragraph::new(help_lines[start_line..end_line].join("\n"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("gridsheet Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"GRIDSHEET

=== CELLS ===
• Any text not starting with = is stored as typed
• Text starting with = is a formula, evaluated once when you press Enter
• The formula is replaced by its result (a number or Error)
• Cells that depend on a changed cell are NOT recalculated

=== FORMULAS ===
+ - * /         Arithmetic with the usual precedence   =2+3*4 → 14
( )             Grouping                               =(2+3)*4 → 20
-x              Unary minus                            =-A1
A1, B12, AA3    Cell references (uppercase only)       =A1+B1

• Empty or out-of-range cells count as 0
• Text cells are inserted as-is and usually produce Error
• Division by zero produces Error

=== MENU (m) ===
Add Row / Delete Row         Append or remove the last row
Add Column / Delete Column   Append or remove the last column
Sort Column                  Reorder rows by the selected column
Sort Row                     Reorder columns by the selected row
Save                         Save the grid as JSON
Log Out                      Quit

The last remaining row or column cannot be deleted.
Sorting compares cell text, so "10" comes before "9".

=== KEYS ===
Arrow keys/hjkl  Move the selection
Enter/F2         Edit the selected cell
Backspace        Clear the selected cell
s / S            Sort by selected column / row
m                Open the menu
Ctrl+S           Save as JSON
Ctrl+O           Load JSON
Ctrl+E           Export CSV
Ctrl+L           Import CSV
F1 or ?          Show this help
q                Quit

=== HELP NAVIGATION ===
↑↓ or j/k        Scroll one line
Page Up/Down     Scroll five lines
Home             Jump to top
Esc/F1/?/q       Close help"#;
