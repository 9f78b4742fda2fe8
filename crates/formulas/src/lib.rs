//! # tabxl Formulas
//!
//! Parsers for the `data-excel` directives that HTML authors put on table
//! markup, and the write-time resolution of those directives into
//! spreadsheet formulas.
//!
//! Cell directives:
//!
//! - `SUM ROW A-C`: sum the current row from column A through C
//! - `SUM ROW A,C`: add cells A and C of the current row
//! - `SUM COL`: sum the current column from the first data row down to the
//!   row above the current one
//! - `FORMULA RAW IF(F13 > 0, F13, 0)`: emit the text unchanged
//! - `FORMULA RELATIVE IF(colm001rowp000 > 0, 1, 0)`: emit the text after
//!   replacing relative tokens (`colm001` is one column to the left,
//!   `rowp000` the current row)
//!
//! Table directive:
//!
//! - `FREEZE 3,1`: freeze panes at row 3, column 1
//!
//! ```
//! use tabxl_formulas::FormulaDirective;
//! use tabxl_primitives::CellAddress;
//!
//! let directive: FormulaDirective = "SUM ROW A-C".parse().unwrap();
//! let resolved = directive.resolve(CellAddress::new(1, 3), None);
//! assert_eq!(resolved.formula, "=SUM(A2:C2)");
//! ```

mod directive;
mod error;
mod layout;
pub mod refs;

pub use directive::{resolve_directive, FormulaDirective, Resolution};
pub use error::{DirectiveError, Result};
pub use layout::LayoutDirective;
pub use refs::locate_cells;
