use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DirectiveError, Result};

/// Parsed form of a table's `data-excel` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirective {
    /// `FREEZE <row>,<col>`
    Freeze { row: u32, col: u16 },
}

impl FromStr for LayoutDirective {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || DirectiveError::InvalidLayout(trimmed.to_string());
        let (keyword, args) = trimmed.split_once(' ').ok_or_else(invalid)?;
        if keyword != "FREEZE" {
            return Err(invalid());
        }
        let (row, col) = args.split_once(',').ok_or_else(invalid)?;
        Ok(LayoutDirective::Freeze {
            row: row.trim().parse().map_err(|_| invalid())?,
            col: col.trim().parse().map_err(|_| invalid())?,
        })
    }
}
