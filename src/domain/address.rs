//! Spreadsheet-style cell addresses.
//!
//! Converts between the textual form (`B12`: column letters followed by a
//! 1-based row number) and zero-based `(row, col)` indices. Column letters
//! are uppercase only; `A`..`Z` map to 0..25 and longer names continue in
//! bijective base 26 (`AA` is 26).

use super::errors::{FormulaError, FormulaResult};
use std::fmt;
use std::str::FromStr;

/// A zero-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parses an address such as `A1` or `C12`.
    ///
    /// Addresses beyond the current grid bounds are still valid here; the
    /// evaluator decides what an out-of-range reference means.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridsheet::domain::CellAddress;
    ///
    /// let addr = CellAddress::parse("B12").unwrap();
    /// assert_eq!((addr.row, addr.col), (11, 1));
    /// assert!(CellAddress::parse("b12").is_err());
    /// ```
    pub fn parse(text: &str) -> FormulaResult<Self> {
        let invalid = || FormulaError::AddressParse(text.to_string());

        let split = text
            .find(|ch: char| !ch.is_ascii_uppercase())
            .ok_or_else(invalid)?;
        let (letters, digits) = text.split_at(split);

        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = column_index(letters).ok_or_else(invalid)?;
        let row = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(invalid)?;

        Ok(Self { row, col })
    }

    /// Column name for a zero-based column index (0 -> `A`, 26 -> `AA`).
    pub fn column_label(col: usize) -> String {
        let mut label = Vec::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            label.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        label.reverse();
        String::from_utf8_lossy(&label).into_owned()
    }
}

fn column_index(letters: &str) -> Option<usize> {
    let mut acc = 0usize;
    for b in letters.bytes() {
        let digit = (b - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_label(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses an address into `(row, col)`.
pub fn parse_address(text: &str) -> FormulaResult<(usize, usize)> {
    CellAddress::parse(text).map(|addr| (addr.row, addr.col))
}

/// Formats zero-based `(row, col)` as an address.
pub fn format_address(row: usize, col: usize) -> String {
    CellAddress::new(row, col).to_string()
}
