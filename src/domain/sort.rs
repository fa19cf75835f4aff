//! Row and column ordering.
//!
//! Both sorts are stable and compare raw cell text lexicographically by
//! UTF-16 code unit, so `"10"` sorts before `"9"`. The sorted matrix is
//! built aside and swapped into the grid in one step.

use super::errors::{GridError, GridResult};
use super::models::Grid;
use std::cmp::Ordering;
use tracing::debug;

pub struct SortEngine;

impl SortEngine {
    /// Reorders whole rows by their value in column `col`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridsheet::domain::{Grid, SortEngine};
    ///
    /// let rows = ["b", "a", "c"].iter().map(|s| vec![s.to_string()]).collect();
    /// let mut grid = Grid::from_rows(rows).unwrap();
    /// SortEngine::sort_by_column(&mut grid, 0).unwrap();
    /// assert_eq!(grid.to_rows(), vec![vec!["a"], vec!["b"], vec!["c"]]);
    /// ```
    pub fn sort_by_column(grid: &mut Grid, col: usize) -> GridResult<()> {
        if col >= grid.cols() {
            return Err(out_of_bounds(grid, 0, col));
        }

        let mut rows = grid.to_rows();
        rows.sort_by(|a, b| compare_cells(&a[col], &b[col]));
        grid.replace_cells(rows);

        debug!(col, "rows sorted by column");
        Ok(())
    }

    /// Reorders whole columns by their value in row `row`.
    ///
    /// Transposes, sorts the transposed rows by index `row`, then
    /// transposes back.
    pub fn sort_by_row(grid: &mut Grid, row: usize) -> GridResult<()> {
        if row >= grid.rows() {
            return Err(out_of_bounds(grid, row, 0));
        }

        let mut columns = transpose(&grid.to_rows());
        columns.sort_by(|a, b| compare_cells(&a[row], &b[row]));
        grid.replace_cells(transpose(&columns));

        debug!(row, "columns sorted by row");
        Ok(())
    }
}

/// Ordering used by both sorts: code-unit comparison of the raw text.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn transpose(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    (0..width)
        .map(|col| rows.iter().map(|row| row[col].clone()).collect())
        .collect()
}

fn out_of_bounds(grid: &Grid, row: usize, col: usize) -> GridError {
    GridError::IndexOutOfBounds {
        row,
        col,
        rows: grid.rows(),
        cols: grid.cols(),
    }
}

/// Sorts rows by column `col`.
pub fn sort_by_column(grid: &mut Grid, col: usize) -> GridResult<()> {
    SortEngine::sort_by_column(grid, col)
}

/// Sorts columns by row `row`.
pub fn sort_by_row(grid: &mut Grid, row: usize) -> GridResult<()> {
    SortEngine::sort_by_row(grid, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(data: &[&[&str]]) -> Grid {
        Grid::from_rows(
            data.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_sort_by_column_single_column() {
        let mut g = grid(&[&["b"], &["a"], &["c"]]);
        sort_by_column(&mut g, 0).unwrap();
        assert_eq!(g, grid(&[&["a"], &["b"], &["c"]]));
    }

    #[test]
    fn test_sort_by_column_moves_whole_rows() {
        let mut g = grid(&[&["2", "x"], &["1", "y"], &["3", "z"]]);
        sort_by_column(&mut g, 0).unwrap();
        assert_eq!(g, grid(&[&["1", "y"], &["2", "x"], &["3", "z"]]));
    }

    #[test]
    fn test_sort_by_column_is_stable() {
        let mut g = grid(&[&["b", "1"], &["a", "2"], &["b", "3"], &["a", "4"]]);
        sort_by_column(&mut g, 0).unwrap();
        assert_eq!(g, grid(&[&["a", "2"], &["a", "4"], &["b", "1"], &["b", "3"]]));
    }

    #[test]
    fn test_sort_by_row_is_stable() {
        let mut g = grid(&[&["b", "a", "b", "a"], &["1", "2", "3", "4"]]);
        sort_by_row(&mut g, 0).unwrap();
        assert_eq!(g, grid(&[&["a", "a", "b", "b"], &["2", "4", "1", "3"]]));
    }

    #[test]
    fn test_comparison_is_lexicographic() {
        let mut g = grid(&[&["9"], &["10"], &[""], &["B"], &["a"]]);
        sort_by_column(&mut g, 0).unwrap();
        assert_eq!(g, grid(&[&[""], &["10"], &["9"], &["B"], &["a"]]));
    }

    #[test]
    fn test_comparison_uses_utf16_units() {
        // U+1F600 encodes as a surrogate pair (0xD83D..), below U+FF21.
        assert_eq!(compare_cells("\u{1F600}", "\u{FF21}"), Ordering::Less);
        assert_eq!(compare_cells("abc", "abd"), Ordering::Less);
        assert_eq!(compare_cells("ab", "ab"), Ordering::Equal);
    }

    #[test]
    fn test_sort_by_row_three_by_three() {
        let mut g = grid(&[
            &["c", "a", "b"],
            &["1", "2", "3"],
            &["x", "y", "z"],
        ]);
        sort_by_row(&mut g, 0).unwrap();
        assert_eq!(
            g,
            grid(&[
                &["a", "b", "c"],
                &["2", "3", "1"],
                &["y", "z", "x"],
            ])
        );
    }

    #[test]
    fn test_sort_by_row_uses_chosen_row() {
        let mut g = grid(&[
            &["p", "q", "r"],
            &["3", "1", "2"],
            &["x", "y", "z"],
        ]);
        sort_by_row(&mut g, 1).unwrap();
        assert_eq!(
            g,
            grid(&[
                &["q", "r", "p"],
                &["1", "2", "3"],
                &["y", "z", "x"],
            ])
        );
    }

    #[test]
    fn test_out_of_range_index_leaves_grid_untouched() {
        let mut g = grid(&[&["b", "a"], &["d", "c"]]);
        let before = g.clone();
        assert!(sort_by_column(&mut g, 2).is_err());
        assert!(sort_by_row(&mut g, 5).is_err());
        assert_eq!(g, before);
    }
}
