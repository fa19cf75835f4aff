use super::errors::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ROWS: usize = 100;
pub const DEFAULT_COLS: usize = 10;

/// Result of a structural edit.
///
/// Deleting the last remaining row or column is refused rather than
/// reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Refused,
}

/// Rectangular, row-major matrix of textual cells.
///
/// Every row has the same length and there is always at least one row and
/// one column. Structural edits either apply to every row or to none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Grid {
    cells: Vec<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cells: blank_rows(DEFAULT_ROWS, DEFAULT_COLS),
        }
    }
}

impl Grid {
    /// Creates a grid of empty cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridsheet::domain::Grid;
    ///
    /// let grid = Grid::new(3, 2).unwrap();
    /// assert_eq!((grid.rows(), grid.cols()), (3, 2));
    /// assert_eq!(grid.get(2, 1).unwrap(), "");
    /// assert!(Grid::new(0, 2).is_err());
    /// ```
    pub fn new(rows: usize, cols: usize) -> GridResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            cells: blank_rows(rows, cols),
        })
    }

    /// Builds a grid from existing rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<String>>) -> GridResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(GridError::InvalidDimensions {
                rows: rows.len(),
                cols,
            });
        }
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != cols)
        {
            return Err(GridError::RaggedRow {
                row,
                expected: cols,
                found,
            });
        }
        Ok(Self { cells: rows })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols()
    }

    fn check_bounds(&self, row: usize, col: usize) -> GridResult<()> {
        if self.contains(row, col) {
            Ok(())
        } else {
            Err(GridError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    pub fn get(&self, row: usize, col: usize) -> GridResult<&str> {
        self.check_bounds(row, col)?;
        Ok(&self.cells[row][col])
    }

    /// Lenient lookup used by formula references: `None` outside the grid.
    pub fn lookup(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Overwrites a cell verbatim. No evaluation happens here.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> GridResult<()> {
        self.check_bounds(row, col)?;
        self.cells[row][col] = value.into();
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.cells.get(row).map(Vec::as_slice)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.cells.clone()
    }

    /// Appends a row of empty cells.
    pub fn add_row(&mut self) -> EditOutcome {
        let cols = self.cols();
        self.cells.push(vec![String::new(); cols]);
        debug!(rows = self.rows(), "row added");
        EditOutcome::Applied
    }

    /// Removes the last row unless it is the only one.
    pub fn delete_row(&mut self) -> EditOutcome {
        if self.rows() <= 1 {
            debug!("refusing to delete the only row");
            return EditOutcome::Refused;
        }
        self.cells.pop();
        debug!(rows = self.rows(), "row deleted");
        EditOutcome::Applied
    }

    /// Appends an empty cell to every row.
    pub fn add_column(&mut self) -> EditOutcome {
        for row in &mut self.cells {
            row.push(String::new());
        }
        debug!(cols = self.cols(), "column added");
        EditOutcome::Applied
    }

    /// Removes the last cell of every row unless only one column remains.
    pub fn delete_column(&mut self) -> EditOutcome {
        if self.cols() <= 1 {
            debug!("refusing to delete the only column");
            return EditOutcome::Refused;
        }
        for row in &mut self.cells {
            row.pop();
        }
        debug!(cols = self.cols(), "column deleted");
        EditOutcome::Applied
    }

    /// Swaps in a whole new matrix at once. Callers guarantee the shape.
    pub(crate) fn replace_cells(&mut self, cells: Vec<Vec<String>>) {
        debug_assert!(!cells.is_empty() && cells.iter().all(|r| r.len() == cells[0].len()));
        self.cells = cells;
    }
}

fn blank_rows(rows: usize, cols: usize) -> Vec<Vec<String>> {
    vec![vec![String::new(); cols]; rows]
}

impl TryFrom<Vec<Vec<String>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<String>> {
    fn from(grid: Grid) -> Self {
        grid.cells
    }
}
