//! # tabxl Primitives
//!
//! Spreadsheet coordinate helpers shared by the formula resolver and the
//! sheet layout engine: zero-based cell addresses, column letters, A1 names
//! and column spans such as `"B:F"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod address;
mod span;

pub use address::{cell_name, column_index, column_name, MAX_COLUMN_COUNT, MAX_ROW_COUNT};
pub use span::ColumnSpan;

/// A zero-based cell position in a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse from A1 notation (e.g., "A1", "$B$2")
    pub fn from_a1(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();
        let stripped = trimmed.replace('$', "");
        let split = stripped
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| AddressError::InvalidRow(trimmed.to_string()))?;
        let (letters, digits) = stripped.split_at(split);
        let col = column_index(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| AddressError::InvalidRow(trimmed.to_string()))?;
        if row == 0 || row > MAX_ROW_COUNT {
            return Err(AddressError::InvalidRow(trimmed.to_string()));
        }
        Ok(Self::new(row - 1, col))
    }

    /// Render in A1 notation.
    pub fn to_a1(self) -> String {
        cell_name(self.row, self.col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Errors raised when parsing coordinates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Invalid column span: {0}")]
    InvalidSpan(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_a1() {
        assert_eq!(CellAddress::from_a1("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::from_a1("$AB$5").unwrap(), CellAddress::new(4, 27));
        assert!(CellAddress::from_a1("A0").is_err());
        assert!(CellAddress::from_a1("12").is_err());
        assert!(CellAddress::from_a1("B").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellAddress::new(13, 4).to_string(), "E14");
    }
}
