use thiserror::Error;

/// Problems found while parsing or resolving a `data-excel` directive.
///
/// None of these abort a conversion on their own; callers decide whether to
/// record them as warnings or to fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("Empty directive")]
    Empty,

    #[error("Unknown directive: {0}")]
    Unknown(String),

    #[error("Missing operand in directive: {0}")]
    MissingOperand(String),

    #[error("Invalid column '{operand}' in directive: {directive}")]
    InvalidColumn { directive: String, operand: String },

    #[error("Malformed relative reference: {0}")]
    MalformedOffset(String),

    #[error("Relative reference {token} falls outside the sheet")]
    OutOfRange { token: String },

    #[error("SUM COL needs a first data row")]
    MissingFirstDataRow,

    #[error("SUM COL at row {row} has no data rows above it")]
    NoRowsAbove { row: u32 },

    #[error("Invalid layout directive: {0}")]
    InvalidLayout(String),
}

pub type Result<T> = std::result::Result<T, DirectiveError>;
