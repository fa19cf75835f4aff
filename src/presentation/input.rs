use crate::application::{App, AppMode};
use crate::infrastructure::{CsvRepository, FileRepository};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Menu => Self::handle_menu_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            mode if mode.is_filename_prompt() => Self::handle_filename_input_mode(app, key),
            _ => {}
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => app.start_save_as(),
                KeyCode::Char('o') => app.start_load_file(),
                KeyCode::Char('e') => app.start_csv_export(),
                KeyCode::Char('l') | KeyCode::Char('i') => app.start_csv_import(),
                _ => {}
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1, 0),
            KeyCode::Left | KeyCode::Char('h') => app.move_selection(0, -1),
            KeyCode::Right | KeyCode::Char('l') => app.move_selection(0, 1),
            KeyCode::Enter | KeyCode::F(2) => app.start_editing(),
            KeyCode::Backspace | KeyCode::Delete => app.clear_selected_cell(),
            KeyCode::Char('s') => app.sort_selected_column(),
            KeyCode::Char('S') => app.sort_selected_row(),
            KeyCode::Char('m') => app.open_menu(),
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => app.log_out(),
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            _ => edit_buffer(&mut app.input, &mut app.cursor_position, key),
        }
    }

    fn handle_menu_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('m') | KeyCode::Char('q') => app.close_menu(),
            KeyCode::Up | KeyCode::Char('k') => app.menu_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.menu_next(),
            KeyCode::Enter => {
                let item = app.selected_menu_item();
                app.activate_menu_item(item);
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => Self::submit_filename(app),
            KeyCode::Esc => app.cancel_filename_input(),
            _ => edit_buffer(&mut app.filename_input, &mut app.cursor_position, key),
        }
    }

    fn submit_filename(app: &mut App) {
        let filename = app.prompt_filename();
        match app.mode {
            AppMode::SaveAs => {
                let result = FileRepository::save(&app.grid, &filename);
                app.set_save_result(filename, result);
            }
            AppMode::LoadFile => {
                let result = FileRepository::load(&filename);
                app.set_load_result(filename, result);
            }
            AppMode::ExportCsv => {
                let result = CsvRepository::export(&app.grid, &filename);
                app.set_csv_export_result(filename, result);
            }
            AppMode::ImportCsv => {
                let result = CsvRepository::import(&filename);
                app.set_csv_import_result(filename, result);
            }
            _ => {}
        }
    }
}

/// Shared line editing for the cell and filename buffers.
///
/// `cursor` is a char index into `buffer`.
fn edit_buffer(buffer: &mut String, cursor: &mut usize, key: KeyCode) {
    let len = buffer.chars().count();
    *cursor = (*cursor).min(len);

    match key {
        KeyCode::Backspace if *cursor > 0 => {
            let at = byte_index(buffer.as_str(), *cursor - 1);
            buffer.remove(at);
            *cursor -= 1;
        }
        KeyCode::Delete if *cursor < len => {
            let at = byte_index(buffer.as_str(), *cursor);
            buffer.remove(at);
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(len),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = len,
        KeyCode::Char(c) => {
            let at = byte_index(buffer.as_str(), *cursor);
            buffer.insert(at, c);
            *cursor += 1;
        }
        _ => {}
    }
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(i, _)| i)
}
