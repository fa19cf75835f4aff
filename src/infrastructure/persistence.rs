use crate::domain::{Grid, GridError};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file format - {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error("CSV file is empty")]
    EmptyCsv,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Saves and loads grids as JSON: an array of rows of strings.
pub struct FileRepository;

impl FileRepository {
    pub fn save(grid: &Grid, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(grid)?;
        fs::write(path, json)?;
        info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "grid saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Grid> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let grid: Grid = serde_json::from_str(&content)?;
        info!(path = %path.display(), rows = grid.rows(), cols = grid.cols(), "grid loaded");
        Ok(grid)
    }
}

/// Exports cell text to CSV and imports CSV data as a new grid.
pub struct CsvRepository;

impl CsvRepository {
    pub fn export(grid: &Grid, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        for row in grid.iter_rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), "grid exported to CSV");
        Ok(())
    }

    /// Reads every record as a row. Short records are padded with empty
    /// cells up to the widest record.
    pub fn import(path: impl AsRef<Path>) -> PersistenceResult<Grid> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(PersistenceError::EmptyCsv);
        }
        for row in &mut rows {
            row.resize(width, String::new());
        }

        let grid = Grid::from_rows(rows)?;
        info!(
            path = %path.display(),
            rows = grid.rows(),
            cols = grid.cols(),
            "grid imported from CSV"
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn sample_grid() -> Grid {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set(0, 0, "name").unwrap();
        grid.set(0, 1, "a, b").unwrap();
        grid.set(1, 2, "42").unwrap();
        grid
    }

    #[test]
    fn test_json_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.json");

        FileRepository::save(&sample_grid(), &path).unwrap();
        let loaded = FileRepository::load(&path).unwrap();
        assert_eq!(loaded, sample_grid());
    }

    #[test]
    fn test_json_load_rejects_ragged_rows() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[["a", "b"], ["c"]]"#).unwrap();
        assert!(matches!(
            FileRepository::load(file.path()),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            FileRepository::load(dir.path().join("missing.json")),
            Err(PersistenceError::Io(_))
        ));
    }

    #[test]
    fn test_csv_export_and_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sheet.csv");

        CsvRepository::export(&sample_grid(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "name,\"a, b\",\n,,42\n");

        let imported = CsvRepository::import(&path).unwrap();
        assert_eq!(imported, sample_grid());
    }

    #[test]
    fn test_csv_import_pads_short_records() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a,b,c\nd\n").unwrap();

        let grid = CsvRepository::import(file.path()).unwrap();
        assert_eq!(
            grid.to_rows(),
            vec![vec!["a", "b", "c"], vec!["d", "", ""]]
        );
    }

    #[test]
    fn test_csv_import_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            CsvRepository::import(file.path()),
            Err(PersistenceError::EmptyCsv)
        ));
    }
}
