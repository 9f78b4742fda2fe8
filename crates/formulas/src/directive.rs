use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tabxl_primitives::{cell_name, column_index, CellAddress};

use crate::error::{DirectiveError, Result};
use crate::refs::locate_cells;

/// Parsed form of a cell's `data-excel` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormulaDirective {
    /// `SUM ROW A-C`
    SumRowRange { first: String, last: String },
    /// `SUM ROW A,C,...`
    SumRowList { columns: Vec<String> },
    /// `SUM COL`
    SumColumn,
    /// `FORMULA RAW <text>`
    Raw(String),
    /// `FORMULA RELATIVE <text>`
    Relative(String),
}

/// The formula produced for one cell plus anything that went wrong on the way.
///
/// An empty `formula` means nothing could be produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub formula: String,
    pub problems: Vec<DirectiveError>,
}

impl Resolution {
    fn formula(formula: String) -> Self {
        Self {
            formula,
            problems: Vec::new(),
        }
    }

    fn failed(problem: DirectiveError) -> Self {
        Self {
            formula: String::new(),
            problems: vec![problem],
        }
    }

    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

impl FormulaDirective {
    /// Resolve against the cell's final position.
    ///
    /// `first_data_row` is the zero-based row where the table body starts and
    /// is only consulted by `SUM COL`.
    pub fn resolve(&self, at: CellAddress, first_data_row: Option<u32>) -> Resolution {
        let row_number = u64::from(at.row) + 1;
        match self {
            FormulaDirective::SumRowRange { first, last } => Resolution::formula(format!(
                "=SUM({first}{row_number}:{last}{row_number})"
            )),
            FormulaDirective::SumRowList { columns } => {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|col| format!("{col}{row_number}"))
                    .collect();
                Resolution::formula(format!("=SUM({})", cells.join("+")))
            }
            FormulaDirective::SumColumn => {
                let Some(first) = first_data_row else {
                    return Resolution::failed(DirectiveError::MissingFirstDataRow);
                };
                if at.row <= first {
                    return Resolution::failed(DirectiveError::NoRowsAbove { row: at.row });
                }
                Resolution::formula(format!(
                    "=SUM({}:{})",
                    cell_name(first, at.col),
                    cell_name(at.row - 1, at.col)
                ))
            }
            FormulaDirective::Raw(text) => Resolution::formula(format!("={text}")),
            FormulaDirective::Relative(text) => {
                let (located, problems) = locate_cells(text, at.row, at.col);
                Resolution {
                    formula: format!("={located}"),
                    problems,
                }
            }
        }
    }
}

/// Parse and resolve in one step. Parse failures resolve to an empty formula.
pub fn resolve_directive(
    directive: &str,
    at: CellAddress,
    first_data_row: Option<u32>,
) -> Resolution {
    match directive.parse::<FormulaDirective>() {
        Ok(parsed) => parsed.resolve(at, first_data_row),
        Err(e) => Resolution::failed(e),
    }
}

impl FromStr for FormulaDirective {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DirectiveError::Empty);
        }

        let mut parts = trimmed.splitn(3, ' ');
        let keyword = parts.next().unwrap_or_default();
        let modifier = parts.next();
        let rest = parts.next();
        let missing = || DirectiveError::MissingOperand(trimmed.to_string());

        match (keyword, modifier) {
            ("SUM", Some("ROW")) => parse_row_columns(trimmed, rest.ok_or_else(missing)?),
            ("SUM", Some("COL")) => Ok(FormulaDirective::SumColumn),
            ("FORMULA", Some("RAW")) => Ok(FormulaDirective::Raw(
                rest.ok_or_else(missing)?.to_string(),
            )),
            ("FORMULA", Some("RELATIVE")) => Ok(FormulaDirective::Relative(
                rest.ok_or_else(missing)?.to_string(),
            )),
            ("SUM" | "FORMULA", None) => Err(missing()),
            _ => Err(DirectiveError::Unknown(trimmed.to_string())),
        }
    }
}

fn parse_row_columns(directive: &str, operand: &str) -> Result<FormulaDirective> {
    let operand = operand.trim();
    let column = |text: &str| -> Result<String> {
        let text = text.trim();
        column_index(text).map_err(|_| DirectiveError::InvalidColumn {
            directive: directive.to_string(),
            operand: text.to_string(),
        })?;
        Ok(text.to_ascii_uppercase())
    };

    if let Some((first, last)) = operand.split_once('-') {
        // Anything after a second '-' is ignored
        let last = last.split('-').next().unwrap_or_default();
        return Ok(FormulaDirective::SumRowRange {
            first: column(first)?,
            last: column(last)?,
        });
    }

    if operand.contains(',') {
        let columns = operand
            .split(',')
            .map(column)
            .collect::<Result<Vec<_>>>()?;
        return Ok(FormulaDirective::SumRowList { columns });
    }

    Err(DirectiveError::InvalidColumn {
        directive: directive.to_string(),
        operand: operand.to_string(),
    })
}

impl fmt::Display for FormulaDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaDirective::SumRowRange { first, last } => write!(f, "SUM ROW {first}-{last}"),
            FormulaDirective::SumRowList { columns } => {
                write!(f, "SUM ROW {}", columns.join(","))
            }
            FormulaDirective::SumColumn => f.write_str("SUM COL"),
            FormulaDirective::Raw(text) => write!(f, "FORMULA RAW {text}"),
            FormulaDirective::Relative(text) => write!(f, "FORMULA RELATIVE {text}"),
        }
    }
}
