//! gridsheet - terminal grid with formula cells.
//!
//! Opens an empty grid (or a JSON/CSV file given on the command line) and
//! runs the interactive session until the user logs out.

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use gridsheet::application::App;
use gridsheet::domain::{DEFAULT_COLS, DEFAULT_ROWS, Grid};
use gridsheet::infrastructure::{
    CsvRepository, FileRepository, PersistenceResult, init_file_logging,
};
use gridsheet::presentation::{InputHandler, render_ui};

#[derive(Parser, Debug)]
#[command(name = "gridsheet", version, about = "Terminal grid with formula cells")]
struct Cli {
    /// Number of rows in a new grid
    #[arg(long, env = "GRIDSHEET_ROWS", default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Number of columns in a new grid
    #[arg(long, env = "GRIDSHEET_COLS", default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Append tracing output to this file
    #[arg(long, env = "GRIDSHEET_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Grid to open: JSON, or CSV when the extension is .csv
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        init_file_logging(log_file)?;
    }

    // Fail before touching the terminal so errors stay readable.
    let mut app = match &cli.file {
        Some(path) => {
            let grid = open_grid(path)?;
            let mut app = App::new(grid);
            if !is_csv(path) {
                app.filename = Some(path.to_string_lossy().into_owned());
            }
            app
        }
        None => App::new(Grid::new(cli.rows, cli.cols)?),
    };
    info!(rows = app.grid.rows(), cols = app.grid.cols(), "session started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn open_grid(path: &Path) -> PersistenceResult<Grid> {
    if is_csv(path) {
        CsvRepository::import(path)
    } else {
        FileRepository::load(path)
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
        }
    }
    Ok(())
}
