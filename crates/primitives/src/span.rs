use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{column_index, column_name, AddressError};

/// An inclusive run of columns written as `"B:F"` (or `"B"` for one column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnSpan {
    pub first: u16,
    pub last: u16,
}

impl ColumnSpan {
    pub fn new(first: u16, last: u16) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    /// Iterate over the zero-based column indices in the span.
    pub fn columns(&self) -> impl Iterator<Item = u16> {
        self.first..=self.last
    }
}

impl FromStr for ColumnSpan {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidSpan(s.to_string());
        let (left, right) = s.split_once(':').unwrap_or((s, s));
        let first = column_index(left.trim().trim_start_matches('$')).map_err(|_| invalid())?;
        let last = column_index(right.trim().trim_start_matches('$')).map_err(|_| invalid())?;
        Ok(Self::new(first, last))
    }
}

impl TryFrom<String> for ColumnSpan {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnSpan> for String {
    fn from(span: ColumnSpan) -> Self {
        span.to_string()
    }
}

impl fmt::Display for ColumnSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", column_name(self.first), column_name(self.last))
    }
}
