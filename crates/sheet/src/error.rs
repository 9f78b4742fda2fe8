use tabxl_formulas::DirectiveError;
use thiserror::Error;

/// Errors that end a conversion run
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No table found in HTML")]
    NoTable,

    #[error("Table {table} has no <tbody> section")]
    MissingBody { table: String },

    #[error("Directive error in sheet '{sheet}' at {cell}: {source}")]
    Directive {
        sheet: String,
        cell: String,
        #[source]
        source: DirectiveError,
    },

    #[error("Invalid layout directive in sheet '{sheet}': {source}")]
    Layout {
        sheet: String,
        #[source]
        source: DirectiveError,
    },

    #[error("Invalid options: {0}")]
    Options(String),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
