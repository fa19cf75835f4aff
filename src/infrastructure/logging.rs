use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "gridsheet=info";

/// Sends tracing output to `path`, appending.
///
/// The terminal belongs to the UI, so nothing is installed unless a log
/// file is requested. `RUST_LOG` overrides the default filter.
pub fn init_file_logging(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
