use thiserror::Error;

/// Contract violations raised by the grid store.
///
/// These abort the single operation that caused them and leave the grid
/// shape untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("a grid needs at least one row and one column, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures inside formula evaluation.
///
/// None of these leave [`crate::domain::evaluate`]; they are folded into the
/// `Error` cell value instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("invalid cell address: {0}")]
    AddressParse(String),

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFiniteResult,

    #[error("formula nests deeper than {0} levels")]
    NestingTooDeep(usize),
}

pub type GridResult<T> = Result<T, GridError>;
pub type FormulaResult<T> = Result<T, FormulaError>;
