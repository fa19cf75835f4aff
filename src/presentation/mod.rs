//! Presentation layer handling terminal UI and user input.
//!
//! Renders the grid with ratatui and maps crossterm key events onto
//! session actions.

pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;
