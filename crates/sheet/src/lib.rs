//! # tabxl Sheet
//!
//! Converts HTML tables to xlsx workbooks (one worksheet per table) or to a
//! single CSV file.
//!
//! The pipeline runs in three stages:
//!
//! 1. [`html`] parses `<table>` markup into [`ParsedTable`]s, classifying each
//!    cell as money, percent, integer, float or text.
//! 2. [`layout`] places each table on a grid ([`SheetLayout`]): page headers,
//!    merged colspans, formats picked by CSS class or cell type, and
//!    `data-excel` formulas resolved against the final cell positions.
//! 3. [`xlsx`] renders the layouts with `rust_xlsxwriter`; [`csv`] writes the
//!    parsed rows as CSV instead.
//!
//! Problems that can be worked around (unknown directives, tables without
//! `<tbody>`) are reported as [`Warning`]s unless
//! [`ConvertOptions::strict`] is set.
//!
//! # Examples
//!
//! ```
//! use tabxl_sheet::{ConvertOptions, WorkbookWriter, parse_fragments, Diagnostics};
//!
//! let html = r#"
//!     <table>
//!         <thead><tr><th>Item</th><th>Cost</th></tr></thead>
//!         <tbody>
//!             <tr><td>Paper</td><td>$12.50</td></tr>
//!             <tr><td>Ink</td><td>$30.00</td></tr>
//!         </tbody>
//!         <tfoot><tr><td>Total</td><td data-excel="SUM COL"></td></tr></tfoot>
//!     </table>
//! "#;
//!
//! let tables = parse_fragments(&[html], &[], false, &mut Diagnostics::new()).unwrap();
//! let writer = WorkbookWriter::new(ConvertOptions::new().with_sheet_names(["Supplies"]));
//! let (bytes, report) = writer.save_to_buffer(&tables).unwrap();
//!
//! assert!(!bytes.is_empty());
//! assert_eq!(report.sheets, vec!["Supplies"]);
//! ```

pub mod cell;
pub mod csv;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod html;
pub mod layout;
pub mod options;
pub mod xlsx;

pub use cell::{classify, CellRole, CellValue, Classification, ParsedCell, SemanticType};
pub use csv::{csv_rows, fragments_to_csv, page_to_csv, write_csv, CsvRow};
pub use diagnostics::{Diagnostics, Warning};
pub use error::{ConvertError, Result};
pub use format::{Align, FormatRegistry, FormatSpec};
pub use html::{
    parse_document, parse_fragments, parse_fragments_json, parse_table, ParsedRow, ParsedTable,
};
pub use layout::{CellContent, LayoutEngine, PlacedCell, SheetLayout};
pub use options::{ColumnRule, ColumnSetting, ConvertOptions};
pub use xlsx::{fragments_to_excel, full_page_to_excel, ConversionReport, WorkbookWriter};
