//! Session state for the grid host.
//!
//! `App` owns the grid for the lifetime of a session and runs the edit
//! workflow: raw input is stored, formulas are evaluated once against the
//! current grid and replaced by their result.

use crate::domain::{CellAddress, EditOutcome, Grid, SortEngine, apply_edit};
use crate::infrastructure::PersistenceResult;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_FILENAME: &str = "grid.json";
pub const DEFAULT_CSV_FILENAME: &str = "grid.csv";

/// Current interaction mode of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigation; shortcuts available
    Normal,
    /// Typing into the selected cell
    Editing,
    /// Dropdown menu is open
    Menu,
    /// Help screen is displayed
    Help,
    SaveAs,
    LoadFile,
    ExportCsv,
    ImportCsv,
}

impl AppMode {
    pub fn is_filename_prompt(self) -> bool {
        matches!(
            self,
            AppMode::SaveAs | AppMode::LoadFile | AppMode::ExportCsv | AppMode::ImportCsv
        )
    }
}

/// Entries of the dropdown menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddRow,
    DeleteRow,
    AddColumn,
    DeleteColumn,
    SortColumn,
    SortRow,
    Save,
    LogOut,
}

impl MenuItem {
    pub const ALL: [MenuItem; 8] = [
        MenuItem::AddRow,
        MenuItem::DeleteRow,
        MenuItem::AddColumn,
        MenuItem::DeleteColumn,
        MenuItem::SortColumn,
        MenuItem::SortRow,
        MenuItem::Save,
        MenuItem::LogOut,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::AddRow => "Add Row",
            MenuItem::DeleteRow => "Delete Row",
            MenuItem::AddColumn => "Add Column",
            MenuItem::DeleteColumn => "Delete Column",
            MenuItem::SortColumn => "Sort Column",
            MenuItem::SortRow => "Sort Row",
            MenuItem::Save => "Save",
            MenuItem::LogOut => "Log Out",
        }
    }
}

/// Grid plus everything the terminal host needs to drive it.
///
/// # Examples
///
/// ```
/// use gridsheet::application::App;
///
/// let mut app = App::default();
/// app.start_editing();
/// app.input = "=2*21".to_string();
/// app.finish_editing();
/// assert_eq!(app.grid.get(0, 0).unwrap(), "42");
/// assert_eq!(app.selected_row, 1);
/// ```
#[derive(Debug)]
pub struct App {
    pub grid: Grid,
    pub selected_row: usize,
    pub selected_col: usize,
    /// Top-left row visible in the viewport
    pub scroll_row: usize,
    /// Left-most column visible in the viewport
    pub scroll_col: usize,
    pub mode: AppMode,
    /// Edit buffer for the selected cell
    pub input: String,
    /// Cursor position within whichever buffer is being edited
    pub cursor_position: usize,
    pub filename: Option<String>,
    pub filename_input: String,
    pub menu_index: usize,
    pub help_scroll: usize,
    pub status_message: Option<String>,
    pub viewport_rows: usize,
    pub viewport_cols: usize,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl App {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            filename: None,
            filename_input: String::new(),
            menu_index: 0,
            help_scroll: 0,
            status_message: None,
            viewport_rows: 20,
            viewport_cols: 8,
            should_quit: false,
        }
    }

    pub fn selected_address(&self) -> CellAddress {
        CellAddress::new(self.selected_row, self.selected_col)
    }

    pub fn selected_value(&self) -> &str {
        self.grid
            .lookup(self.selected_row, self.selected_col)
            .unwrap_or("")
    }

    /// Loads the selected cell's stored text into the edit buffer.
    pub fn start_editing(&mut self) {
        self.mode = AppMode::Editing;
        self.input = self.selected_value().to_string();
        self.cursor_position = self.input.chars().count();
    }

    /// Commits the edit buffer to the selected cell and moves down a row.
    pub fn finish_editing(&mut self) {
        let (row, col) = (self.selected_row, self.selected_col);
        match apply_edit(&mut self.grid, row, col, &self.input) {
            Ok(_) => {
                if self.selected_row + 1 < self.grid.rows() {
                    self.selected_row += 1;
                    self.ensure_cursor_visible();
                }
            }
            Err(err) => {
                warn!(error = %err, "cell edit rejected");
                self.status_message = Some(format!("Edit failed: {}", err));
            }
        }

        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn clear_selected_cell(&mut self) {
        let (row, col) = (self.selected_row, self.selected_col);
        if let Err(err) = self.grid.set(row, col, "") {
            self.status_message = Some(format!("Clear failed: {}", err));
        }
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Moves the selection, staying inside the grid.
    pub fn move_selection(&mut self, row_delta: isize, col_delta: isize) {
        self.selected_row = self
            .selected_row
            .saturating_add_signed(row_delta)
            .min(self.grid.rows() - 1);
        self.selected_col = self
            .selected_col
            .saturating_add_signed(col_delta)
            .min(self.grid.cols() - 1);
        self.ensure_cursor_visible();
    }

    pub fn add_row(&mut self) {
        self.grid.add_row();
        self.status_message = Some(format!("Row added ({} rows)", self.grid.rows()));
    }

    pub fn delete_row(&mut self) {
        self.status_message = Some(match self.grid.delete_row() {
            EditOutcome::Applied => format!("Row deleted ({} rows)", self.grid.rows()),
            EditOutcome::Refused => "Cannot delete the only row".to_string(),
        });
        self.clamp_selection();
    }

    pub fn add_column(&mut self) {
        self.grid.add_column();
        self.status_message = Some(format!("Column added ({} columns)", self.grid.cols()));
    }

    pub fn delete_column(&mut self) {
        self.status_message = Some(match self.grid.delete_column() {
            EditOutcome::Applied => format!("Column deleted ({} columns)", self.grid.cols()),
            EditOutcome::Refused => "Cannot delete the only column".to_string(),
        });
        self.clamp_selection();
    }

    /// Sorts rows by the selected column.
    pub fn sort_selected_column(&mut self) {
        let col = self.selected_col;
        self.status_message = Some(match SortEngine::sort_by_column(&mut self.grid, col) {
            Ok(()) => format!("Rows sorted by column {}", CellAddress::column_label(col)),
            Err(err) => format!("Sort failed: {}", err),
        });
    }

    /// Sorts columns by the selected row.
    pub fn sort_selected_row(&mut self) {
        let row = self.selected_row;
        self.status_message = Some(match SortEngine::sort_by_row(&mut self.grid, row) {
            Ok(()) => format!("Columns sorted by row {}", row + 1),
            Err(err) => format!("Sort failed: {}", err),
        });
    }

    fn clamp_selection(&mut self) {
        self.selected_row = self.selected_row.min(self.grid.rows() - 1);
        self.selected_col = self.selected_col.min(self.grid.cols() - 1);
        self.scroll_row = self.scroll_row.min(self.selected_row);
        self.scroll_col = self.scroll_col.min(self.selected_col);
    }

    pub fn open_menu(&mut self) {
        self.mode = AppMode::Menu;
        self.menu_index = 0;
    }

    pub fn close_menu(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn menu_next(&mut self) {
        self.menu_index = (self.menu_index + 1) % MenuItem::ALL.len();
    }

    pub fn menu_previous(&mut self) {
        self.menu_index = (self.menu_index + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_index % MenuItem::ALL.len()]
    }

    /// Runs a menu entry and closes the menu.
    pub fn activate_menu_item(&mut self, item: MenuItem) {
        self.mode = AppMode::Normal;
        match item {
            MenuItem::AddRow => self.add_row(),
            MenuItem::DeleteRow => self.delete_row(),
            MenuItem::AddColumn => self.add_column(),
            MenuItem::DeleteColumn => self.delete_column(),
            MenuItem::SortColumn => self.sort_selected_column(),
            MenuItem::SortRow => self.sort_selected_row(),
            MenuItem::Save => self.start_save_as(),
            MenuItem::LogOut => self.log_out(),
        }
    }

    /// Ends the session.
    pub fn log_out(&mut self) {
        info!("session ended");
        self.should_quit = true;
    }

    fn start_filename_prompt(&mut self, mode: AppMode, default: String) {
        self.mode = mode;
        self.filename_input = default;
        self.cursor_position = self.filename_input.chars().count();
        self.status_message = None;
    }

    pub fn start_save_as(&mut self) {
        let default = self
            .filename
            .clone()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        self.start_filename_prompt(AppMode::SaveAs, default);
    }

    pub fn start_load_file(&mut self) {
        let default = self
            .filename
            .clone()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        self.start_filename_prompt(AppMode::LoadFile, default);
    }

    pub fn start_csv_export(&mut self) {
        let default = self
            .filename
            .as_ref()
            .map(|f| Path::new(f).with_extension("csv").to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_CSV_FILENAME.to_string());
        self.start_filename_prompt(AppMode::ExportCsv, default);
    }

    pub fn start_csv_import(&mut self) {
        self.start_filename_prompt(AppMode::ImportCsv, DEFAULT_CSV_FILENAME.to_string());
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Filename typed at the prompt, or the default for the current mode.
    pub fn prompt_filename(&self) -> String {
        if !self.filename_input.is_empty() {
            return self.filename_input.clone();
        }
        match self.mode {
            AppMode::ExportCsv | AppMode::ImportCsv => DEFAULT_CSV_FILENAME.to_string(),
            _ => DEFAULT_FILENAME.to_string(),
        }
    }

    fn finish_filename_prompt(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    pub fn set_save_result(&mut self, filename: String, result: PersistenceResult<()>) {
        match result {
            Ok(()) => {
                self.status_message = Some(format!("Saved to {}", filename));
                self.filename = Some(filename);
            }
            Err(err) => {
                warn!(%filename, error = %err, "save failed");
                self.status_message = Some(format!("Save failed: {}", err));
            }
        }
        self.finish_filename_prompt();
    }

    pub fn set_load_result(&mut self, filename: String, result: PersistenceResult<Grid>) {
        match result {
            Ok(grid) => {
                self.replace_grid(grid);
                self.status_message = Some(format!("Loaded from {}", filename));
                self.filename = Some(filename);
            }
            Err(err) => {
                warn!(%filename, error = %err, "load failed");
                self.status_message = Some(format!("Load failed: {}", err));
            }
        }
        self.finish_filename_prompt();
    }

    pub fn set_csv_export_result(&mut self, filename: String, result: PersistenceResult<()>) {
        self.status_message = Some(match result {
            Ok(()) => format!("Exported to {}", filename),
            Err(err) => {
                warn!(%filename, error = %err, "CSV export failed");
                format!("Export failed: {}", err)
            }
        });
        self.finish_filename_prompt();
    }

    /// Imported CSV replaces the grid but does not become the save target.
    pub fn set_csv_import_result(&mut self, filename: String, result: PersistenceResult<Grid>) {
        match result {
            Ok(grid) => {
                self.replace_grid(grid);
                self.status_message = Some(format!("Imported {}", filename));
            }
            Err(err) => {
                warn!(%filename, error = %err, "CSV import failed");
                self.status_message = Some(format!("Import failed: {}", err));
            }
        }
        self.finish_filename_prompt();
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_row = 0;
        self.scroll_col = 0;
    }

    pub fn update_viewport_size(&mut self, rows: usize, cols: usize) {
        self.viewport_rows = rows.max(1);
        self.viewport_cols = cols.max(1);
        self.ensure_cursor_visible();
    }

    /// Scrolls so the selected cell is inside the viewport.
    pub fn ensure_cursor_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }

        if self.selected_col < self.scroll_col {
            self.scroll_col = self.selected_col;
        } else if self.selected_col >= self.scroll_col + self.viewport_cols {
            self.scroll_col = self.selected_col + 1 - self.viewport_cols;
        }
    }
}
