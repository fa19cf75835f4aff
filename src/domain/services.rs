//! Formula evaluation against a grid snapshot.
//!
//! Evaluation runs in two steps. Every cell reference in the formula body
//! is first replaced by the referenced cell's current content, then the
//! resulting text is handed to the arithmetic [`Parser`]. Referenced cells
//! are read as stored: a formula cell holds its last result, so nothing
//! is re-evaluated and there is no dependency tracking.

use super::address::CellAddress;
use super::errors::{FormulaResult, GridResult};
use super::models::Grid;
use super::parser::Parser;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Text stored in a cell whose formula could not be evaluated.
pub const ERROR_MARKER: &str = "Error";

static CELL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[0-9]+").expect("cell reference pattern is valid"));

/// Outcome of evaluating a formula: a number or the error marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Number(f64),
    Error,
}

impl From<FormulaResult<f64>> for Evaluation {
    fn from(result: FormulaResult<f64>) -> Self {
        match result {
            // -0 displays as 0
            Ok(value) if value == 0.0 => Evaluation::Number(0.0),
            Ok(value) => Evaluation::Number(value),
            Err(_) => Evaluation::Error,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Number(value) => write!(f, "{value}"),
            Evaluation::Error => f.write_str(ERROR_MARKER),
        }
    }
}

/// Evaluates formula bodies against a borrowed grid.
///
/// # Examples
///
/// ```
/// use gridsheet::domain::{Evaluation, FormulaEvaluator, Grid};
///
/// let mut grid = Grid::new(2, 2).unwrap();
/// grid.set(0, 0, "3").unwrap();
/// grid.set(0, 1, "4").unwrap();
///
/// let evaluator = FormulaEvaluator::new(&grid);
/// assert_eq!(evaluator.evaluate("A1+B1"), Evaluation::Number(7.0));
/// assert_eq!(evaluator.evaluate("2+"), Evaluation::Error);
/// assert_eq!(evaluator.evaluate_formula("=A1*B1"), "12");
/// assert_eq!(evaluator.evaluate_formula("hello"), "hello");
/// ```
pub struct FormulaEvaluator<'a> {
    grid: &'a Grid,
}

impl<'a> FormulaEvaluator<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Evaluates a formula body (the text after `=`).
    ///
    /// Failures never escape; they come back as [`Evaluation::Error`].
    pub fn evaluate(&self, expression: &str) -> Evaluation {
        let result = self.try_evaluate(expression);
        if let Err(err) = &result {
            debug!(expression, error = %err, "formula evaluation failed");
        }
        result.into()
    }

    /// Returns the display text for raw cell input: literals pass through,
    /// formulas are evaluated.
    pub fn evaluate_formula(&self, input: &str) -> String {
        match input.strip_prefix('=') {
            Some(expression) => self.evaluate(expression).to_string(),
            None => input.to_string(),
        }
    }

    fn try_evaluate(&self, expression: &str) -> FormulaResult<f64> {
        let substituted = self.substitute_references(expression)?;
        Parser::new(&substituted)?.parse()?.evaluate()
    }

    /// Replaces every cell reference with the referenced cell's content.
    ///
    /// Missing, empty and out-of-range cells read as `0`. Numeric cells are
    /// inserted parenthesised so a negative value keeps its sign under any
    /// neighbouring operator. Anything else is inserted verbatim and will
    /// usually fail to parse.
    pub fn substitute_references(&self, expression: &str) -> FormulaResult<String> {
        let mut failure = None;
        let substituted = CELL_REFERENCE.replace_all(expression, |caps: &Captures| {
            match CellAddress::parse(&caps[0]) {
                Ok(addr) => self.reference_text(addr),
                Err(err) => {
                    if failure.is_none() {
                        failure = Some(err);
                    }
                    String::new()
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(substituted.into_owned()),
        }
    }

    fn reference_text(&self, addr: CellAddress) -> String {
        let raw = self.grid.lookup(addr.row, addr.col).unwrap_or("");
        if raw.is_empty() {
            return "0".to_string();
        }
        match numeric_value(raw) {
            Some(value) => format!("({value})"),
            None => raw.to_string(),
        }
    }
}

fn numeric_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Evaluates a formula body against `grid`.
pub fn evaluate(expression: &str, grid: &Grid) -> Evaluation {
    FormulaEvaluator::new(grid).evaluate(expression)
}

/// Stores raw input in a cell, evaluating it first when it is a formula.
///
/// The raw text is written before evaluation so the formula sees the grid
/// as edited; the formula text is then replaced by its result. Returns the
/// text left in the cell.
pub fn apply_edit(grid: &mut Grid, row: usize, col: usize, input: &str) -> GridResult<String> {
    grid.set(row, col, input)?;

    let Some(expression) = input.strip_prefix('=') else {
        return Ok(input.to_string());
    };

    let result = evaluate(expression, grid).to_string();
    grid.set(row, col, result.clone())?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormulaError;

    fn create_test_grid() -> Grid {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(0, 0, "10").unwrap();
        grid.set(0, 1, "20").unwrap();
        grid.set(0, 2, "30").unwrap();
        grid.set(1, 0, "5").unwrap();
        grid.set(1, 1, "-4").unwrap();
        grid.set(1, 2, "hello").unwrap();
        grid.set(2, 0, "Error").unwrap();
        grid.set(2, 1, "1+2").unwrap();
        grid
    }

    #[test]
    fn test_simple_arithmetic() {
        let grid = create_test_grid();
        assert_eq!(evaluate("2+3", &grid), Evaluation::Number(5.0));
        assert_eq!(evaluate("10-3", &grid), Evaluation::Number(7.0));
        assert_eq!(evaluate("4*5", &grid), Evaluation::Number(20.0));
        assert_eq!(evaluate("15/3", &grid), Evaluation::Number(5.0));
        assert_eq!(evaluate("2+3*4", &grid), Evaluation::Number(14.0));
        assert_eq!(evaluate("(2+3)*4", &grid), Evaluation::Number(20.0));
    }

    #[test]
    fn test_cell_references() {
        let grid = create_test_grid();
        assert_eq!(evaluate("A1+B1", &grid), Evaluation::Number(30.0));
        assert_eq!(evaluate("C1-A1", &grid), Evaluation::Number(20.0));
        assert_eq!(evaluate("A1*A2", &grid), Evaluation::Number(50.0));
        assert_eq!(evaluate("B1/A2", &grid), Evaluation::Number(4.0));
    }

    #[test]
    fn test_negative_cell_keeps_sign() {
        let grid = create_test_grid();
        assert_eq!(evaluate("A1-B2", &grid), Evaluation::Number(14.0));
        assert_eq!(evaluate("B2*B2", &grid), Evaluation::Number(16.0));
    }

    #[test]
    fn test_missing_references_read_as_zero() {
        let grid = create_test_grid();
        assert_eq!(evaluate("E5+1", &grid), Evaluation::Number(1.0));
        assert_eq!(evaluate("Z1+1", &grid), Evaluation::Number(1.0));
        assert_eq!(evaluate("A999+2", &grid), Evaluation::Number(2.0));
    }

    #[test]
    fn test_text_cells_are_substituted_verbatim() {
        let grid = create_test_grid();
        assert_eq!(evaluate("C2+1", &grid), Evaluation::Error);
        assert_eq!(evaluate("A3+1", &grid), Evaluation::Error);
        // "1+2" lands in the expression as-is: 1+2*2
        assert_eq!(evaluate("B3*2", &grid), Evaluation::Number(5.0));
    }

    #[test]
    fn test_substitution_text() {
        let grid = create_test_grid();
        let evaluator = FormulaEvaluator::new(&grid);
        assert_eq!(
            evaluator.substitute_references("A1 + B2 * Q9").unwrap(),
            "(10) + (-4) * 0"
        );
        let huge = format!("{}1", "Z".repeat(40));
        assert!(matches!(
            evaluator.substitute_references(&huge),
            Err(FormulaError::AddressParse(_))
        ));
    }

    #[test]
    fn test_error_cases() {
        let grid = create_test_grid();
        assert_eq!(evaluate("2+", &grid), Evaluation::Error);
        assert_eq!(evaluate("2/0", &grid), Evaluation::Error);
        assert_eq!(evaluate("A1/Z9", &grid), Evaluation::Error);
        assert_eq!(evaluate("", &grid), Evaluation::Error);
        assert_eq!(evaluate("a1+1", &grid), Evaluation::Error);
        assert_eq!(evaluate("SUM(A1)", &grid), Evaluation::Error);
    }

    #[test]
    fn test_deeply_nested_formulas_become_error() {
        let mut grid = create_test_grid();
        let parens = format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(evaluate(&parens, &grid), Evaluation::Error);
        assert_eq!(evaluate(&format!("{}1", "-".repeat(40_000)), &grid), Evaluation::Error);

        // Text cells are substituted verbatim, nesting included.
        grid.set(4, 4, "(".repeat(20_000)).unwrap();
        assert_eq!(evaluate("E5 1", &grid), Evaluation::Error);
        assert_eq!(apply_edit(&mut grid, 3, 3, "=E5+1").unwrap(), "Error");
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(Evaluation::Number(7.0).to_string(), "7");
        assert_eq!(Evaluation::Number(0.5).to_string(), "0.5");
        assert_eq!(Evaluation::Error.to_string(), "Error");
        assert_eq!(Evaluation::from(Ok(-0.0)).to_string(), "0");

        let grid = create_test_grid();
        assert_eq!(evaluate("1/3", &grid).to_string(), "0.3333333333333333");
        assert_eq!(evaluate("22/7", &grid).to_string(), "3.142857142857143");
    }

    #[test]
    fn test_evaluate_formula_passthrough() {
        let grid = create_test_grid();
        let evaluator = FormulaEvaluator::new(&grid);
        assert_eq!(evaluator.evaluate_formula("hello"), "hello");
        assert_eq!(evaluator.evaluate_formula("123"), "123");
        assert_eq!(evaluator.evaluate_formula(""), "");
        assert_eq!(evaluator.evaluate_formula("= 2 + 3 "), "5");
        assert_eq!(evaluator.evaluate_formula("=2+"), "Error");
    }

    #[test]
    fn test_apply_edit_stores_result() {
        let mut grid = create_test_grid();
        assert_eq!(apply_edit(&mut grid, 3, 0, "=A1+B1").unwrap(), "30");
        assert_eq!(grid.get(3, 0).unwrap(), "30");

        assert_eq!(apply_edit(&mut grid, 3, 1, "plain").unwrap(), "plain");
        assert_eq!(grid.get(3, 1).unwrap(), "plain");

        assert_eq!(apply_edit(&mut grid, 3, 2, "=1/0").unwrap(), "Error");
        assert!(apply_edit(&mut grid, 9, 0, "=1").is_err());
    }

    #[test]
    fn test_no_recompute_after_source_changes() {
        let mut grid = create_test_grid();
        apply_edit(&mut grid, 4, 0, "=A1*2").unwrap();
        grid.set(0, 0, "100").unwrap();
        assert_eq!(grid.get(4, 0).unwrap(), "20");
    }

    #[test]
    fn test_reading_formula_cell_uses_stored_result() {
        let mut grid = create_test_grid();
        apply_edit(&mut grid, 4, 0, "=1/0").unwrap();
        apply_edit(&mut grid, 4, 1, "=A5+1").unwrap();
        assert_eq!(grid.get(4, 1).unwrap(), "Error");

        apply_edit(&mut grid, 4, 2, "=A1+5").unwrap();
        apply_edit(&mut grid, 4, 3, "=C5*2").unwrap();
        assert_eq!(grid.get(4, 3).unwrap(), "30");
    }

    #[test]
    fn test_self_reference_reads_raw_formula() {
        let mut grid = create_test_grid();
        // A4 holds "=A4+1" when evaluated, which is not arithmetic.
        assert_eq!(apply_edit(&mut grid, 3, 0, "=A4+1").unwrap(), "Error");
    }
}
