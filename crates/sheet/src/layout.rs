//! Sheet layout
//!
//! [`LayoutEngine::layout`] places one parsed table on a grid: page header
//! lines, header rows, body rows and footer rows, one after another, with
//! colspans turned into merged ranges and `data-excel` directives resolved
//! against each cell's final position. The result is a [`SheetLayout`], plain
//! data that the xlsx writer renders afterwards.
//!
//! The engine keeps no cursor between calls. Row positions and the first data
//! row are passed explicitly to [`LayoutEngine::write_cell`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tabxl_formulas::{resolve_directive, LayoutDirective};
use tabxl_primitives::{CellAddress, MAX_COLUMN_COUNT};

use crate::cell::{CellValue, ParsedCell};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{ConvertError, Result};
use crate::format::{FormatRegistry, BOLD, HEADER, TITLE};
use crate::html::{ParsedRow, ParsedTable};
use crate::options::{ColumnRule, ColumnSetting, ConvertOptions};

/// What ends up in a placed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellContent {
    Blank,
    Number(f64),
    Text(String),
    /// Formula text including the leading `=`
    Formula(String),
}

impl From<&CellValue> for CellContent {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Int(i) => CellContent::Number(*i as f64),
            CellValue::Float(f) => CellContent::Number(*f),
            CellValue::Text(s) if s.is_empty() => CellContent::Blank,
            CellValue::Text(s) => CellContent::Text(s.clone()),
        }
    }
}

/// One cell (or merged range, when `last_col > col`) on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub row: u32,
    pub col: u16,
    pub last_col: u16,
    pub content: CellContent,
    /// Format registry key
    pub format: Option<String>,
}

impl PlacedCell {
    pub fn is_merged(&self) -> bool {
        self.last_col > self.col
    }

    pub fn covers(&self, row: u32, col: u16) -> bool {
        self.row == row && (self.col..=self.last_col).contains(&col)
    }
}

/// A worksheet ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub name: String,
    /// Width used for page header merges: at least 2, else the widest header row
    pub column_count: u16,
    pub columns: BTreeMap<u16, ColumnSetting>,
    pub freeze: CellAddress,
    pub first_data_row: u32,
    pub cells: Vec<PlacedCell>,
}

impl SheetLayout {
    fn new(name: &str, column_count: u16) -> Self {
        Self {
            name: name.to_string(),
            column_count,
            columns: BTreeMap::new(),
            freeze: CellAddress::new(0, 0),
            first_data_row: 0,
            cells: Vec::new(),
        }
    }

    /// The placed cell covering `(row, col)`, merged ranges included.
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&PlacedCell> {
        self.cells.iter().find(|cell| cell.covers(row, col))
    }

    /// Number of rows spanned by the layout.
    pub fn row_count(&self) -> u32 {
        self.cells.iter().map(|cell| cell.row + 1).max().unwrap_or(0)
    }
}

/// Lays parsed tables out as sheets.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    registry: FormatRegistry,
    include_formulas: bool,
    strict: bool,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(FormatRegistry::builtin())
    }
}

impl LayoutEngine {
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            registry,
            include_formulas: true,
            strict: false,
        }
    }

    /// Engine configured from run options, custom formats included.
    pub fn from_options(options: &ConvertOptions) -> Self {
        Self {
            registry: FormatRegistry::with_custom(&options.custom_formats),
            include_formulas: options.include_formulas,
            strict: options.strict,
        }
    }

    #[must_use]
    pub fn with_formulas(mut self, include_formulas: bool) -> Self {
        self.include_formulas = include_formulas;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Lay out one table as a sheet named `name`.
    pub fn layout(
        &self,
        name: &str,
        table: &ParsedTable,
        extra_headers: &[String],
        column_rules: &[ColumnRule],
        show_caption: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<SheetLayout> {
        let column_count = table.header_width().clamp(2, usize::from(MAX_COLUMN_COUNT)) as u16;
        let mut sheet = SheetLayout::new(name, column_count);

        for rule in column_rules {
            if let Some(setting) = rule.setting() {
                for col in rule.columns.columns() {
                    sheet.columns.insert(col, setting);
                }
            }
        }

        let mut lines: Vec<&str> = extra_headers.iter().map(String::as_str).collect();
        if show_caption {
            if let Some(caption) = &table.caption {
                lines.push(caption);
            }
        }

        let mut row = 0u32;
        for (i, line) in lines.iter().enumerate() {
            let format = if i == 0 { TITLE } else { BOLD };
            sheet.cells.push(PlacedCell {
                row,
                col: 0,
                last_col: column_count - 1,
                content: CellContent::from(&CellValue::Text((*line).to_string())),
                format: Some(format.to_string()),
            });
            row += 1;
        }
        if !lines.is_empty() {
            // spacer
            row += 1;
        }

        for header in &table.header_rows {
            self.write_row(&mut sheet, row, header, |_| Some(HEADER), None, diagnostics)?;
            row += 1;
        }

        sheet.freeze = self.freeze(&sheet.name, table, row, diagnostics)?;
        let first_data_row = row;
        sheet.first_data_row = first_data_row;

        for data_row in table.body_rows.iter().chain(&table.footer_rows) {
            self.write_row(
                &mut sheet,
                row,
                data_row,
                |cell| Some(cell.role.tag()),
                Some(first_data_row),
                diagnostics,
            )?;
            row += 1;
        }

        tracing::debug!(
            sheet = %sheet.name,
            rows = row,
            cells = sheet.cells.len(),
            "laid out sheet"
        );

        Ok(sheet)
    }

    fn write_row(
        &self,
        sheet: &mut SheetLayout,
        row: u32,
        cells: &ParsedRow,
        default_format: impl Fn(&ParsedCell) -> Option<&'static str>,
        first_data_row: Option<u32>,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        let mut col = 0u16;
        for cell in cells {
            col = self.write_cell(
                sheet,
                row,
                col,
                cell,
                default_format(cell),
                first_data_row,
                diagnostics,
            )?;
        }
        Ok(())
    }

    /// Place one cell at `(row, col)` and return the next free column.
    ///
    /// A `data-excel` directive (when formulas are enabled) replaces the
    /// cell's value with the resolved formula. If nothing could be resolved
    /// the literal value is kept. Cells with `colspan > 1` become merged
    /// ranges.
    pub fn write_cell(
        &self,
        sheet: &mut SheetLayout,
        row: u32,
        col: u16,
        cell: &ParsedCell,
        default_format: Option<&str>,
        first_data_row: Option<u32>,
        diagnostics: &mut Diagnostics,
    ) -> Result<u16> {
        let at = CellAddress::new(row, col);
        let mut content = CellContent::from(&cell.value);

        if let Some(directive) = cell.formula_directive().filter(|_| self.include_formulas) {
            let resolution = resolve_directive(directive, at, first_data_row);
            for problem in resolution.problems {
                if self.strict {
                    return Err(ConvertError::Directive {
                        sheet: sheet.name.clone(),
                        cell: at.to_a1(),
                        source: problem,
                    });
                }
                diagnostics.warn(Warning::Directive {
                    sheet: sheet.name.clone(),
                    cell: at.to_a1(),
                    problem,
                });
            }
            if !resolution.formula.is_empty() {
                content = CellContent::Formula(resolution.formula);
            }
        }

        let format = self.registry.resolve(cell, default_format).map(str::to_string);
        let last_col = col.saturating_add(cell.colspan.max(1) - 1);
        sheet.cells.push(PlacedCell {
            row,
            col,
            last_col,
            content,
            format,
        });
        Ok(last_col.saturating_add(1))
    }

    /// Freeze pane from the table's `FREEZE r,c` directive, else below the
    /// header rows.
    fn freeze(
        &self,
        sheet: &str,
        table: &ParsedTable,
        first_data_row: u32,
        diagnostics: &mut Diagnostics,
    ) -> Result<CellAddress> {
        let default = CellAddress::new(first_data_row, 0);
        let Some(directive) = &table.layout_directive else {
            return Ok(default);
        };

        match directive.parse::<LayoutDirective>() {
            Ok(LayoutDirective::Freeze { row, col }) => Ok(CellAddress::new(row, col)),
            Err(source) if self.strict => Err(ConvertError::Layout {
                sheet: sheet.to_string(),
                source,
            }),
            Err(problem) => {
                diagnostics.warn(Warning::Layout {
                    sheet: sheet.to_string(),
                    problem,
                });
                Ok(default)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellRole;
    use crate::format::{MONEY, PERCENT};
    use tabxl_formulas::DirectiveError;

    fn td(text: &str) -> ParsedCell {
        ParsedCell::new(text, CellRole::Data)
    }

    fn th(text: &str) -> ParsedCell {
        ParsedCell::new(text, CellRole::Header)
    }

    fn labor_table() -> ParsedTable {
        ParsedTable {
            caption: Some("Labor".to_string()),
            header_rows: vec![vec![th("Name"), th("Hours"), th("Rate"), th("Total")]],
            body_rows: vec![
                vec![
                    td("Alice"),
                    td("10"),
                    td("$20.00"),
                    td("0").with_attribute("data-excel", "FORMULA RELATIVE colm002rowp000*colm001rowp000"),
                ],
                vec![
                    td("Bob"),
                    td("5"),
                    td("$30.00"),
                    td("0").with_attribute("data-excel", "FORMULA RELATIVE colm002rowp000*colm001rowp000"),
                ],
            ],
            footer_rows: vec![vec![
                td("Total").with_attribute("colspan", "3"),
                td("0").with_attribute("data-excel", "SUM COL"),
            ]],
            id: Some("labor".to_string()),
            layout_directive: None,
        }
    }

    #[test]
    fn test_colspan_header_merges() {
        let engine = LayoutEngine::default();
        let mut sheet = SheetLayout::new("s", 4);
        let mut diagnostics = Diagnostics::new();
        let cell = th("Period").with_attribute("colspan", "3");

        let next = engine
            .write_cell(&mut sheet, 0, 0, &cell, Some(HEADER), None, &mut diagnostics)
            .unwrap();

        assert_eq!(next, 3);
        let placed = &sheet.cells[0];
        assert_eq!((placed.col, placed.last_col), (0, 2));
        assert!(placed.is_merged());
        assert_eq!(placed.format.as_deref(), Some(HEADER));
        assert_eq!(placed.content, CellContent::Text("Period".to_string()));
    }

    #[test]
    fn test_write_cell_formats() {
        let engine = LayoutEngine::default();
        let mut sheet = SheetLayout::new("s", 2);
        let mut diagnostics = Diagnostics::new();

        engine
            .write_cell(&mut sheet, 0, 0, &td("$5"), Some("td"), None, &mut diagnostics)
            .unwrap();
        engine
            .write_cell(&mut sheet, 0, 1, &td("5%"), Some("td"), None, &mut diagnostics)
            .unwrap();
        engine
            .write_cell(
                &mut sheet,
                0,
                2,
                &td("$5").with_attribute("class", "dollars"),
                Some("td"),
                None,
                &mut diagnostics,
            )
            .unwrap();
        engine
            .write_cell(&mut sheet, 0, 3, &td("x"), Some("td"), None, &mut diagnostics)
            .unwrap();

        let formats: Vec<_> = sheet.cells.iter().map(|c| c.format.as_deref()).collect();
        assert_eq!(formats, vec![Some(MONEY), Some(PERCENT), Some("dollars"), Some("td")]);
        assert_eq!(sheet.cells[0].content, CellContent::Number(5.0));
        assert_eq!(sheet.cells[1].content, CellContent::Number(0.05));
    }

    #[test]
    fn test_layout_positions() {
        let engine = LayoutEngine::default();
        let mut diagnostics = Diagnostics::new();
        let sheet = engine
            .layout(
                "Labor",
                &labor_table(),
                &["Acme Corp".to_string()],
                &[],
                true,
                &mut diagnostics,
            )
            .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(sheet.column_count, 4);

        // Title, caption, spacer, header row
        let title = sheet.cell_at(0, 3).unwrap();
        assert_eq!(title.content, CellContent::Text("Acme Corp".to_string()));
        assert_eq!(title.format.as_deref(), Some(TITLE));
        assert_eq!(sheet.cell_at(1, 0).unwrap().format.as_deref(), Some(BOLD));
        assert!(sheet.cell_at(2, 0).is_none());
        assert_eq!(sheet.cell_at(3, 1).unwrap().format.as_deref(), Some(HEADER));

        assert_eq!(sheet.first_data_row, 4);
        assert_eq!(sheet.freeze, CellAddress::new(4, 0));

        assert_eq!(
            sheet.cell_at(4, 3).unwrap().content,
            CellContent::Formula("=B5*C5".to_string())
        );
        assert_eq!(sheet.cell_at(4, 2).unwrap().format.as_deref(), Some(MONEY));
        assert_eq!(sheet.cell_at(4, 0).unwrap().format.as_deref(), Some("td"));

        let total = sheet.cell_at(6, 1).unwrap();
        assert_eq!((total.col, total.last_col), (0, 2));
        assert_eq!(
            sheet.cell_at(6, 3).unwrap().content,
            CellContent::Formula("=SUM(D5:D6)".to_string())
        );
        assert_eq!(sheet.row_count(), 7);
    }

    #[test]
    fn test_caption_hidden_and_no_page_headers() {
        let engine = LayoutEngine::default();
        let mut diagnostics = Diagnostics::new();
        let sheet = engine
            .layout("Labor", &labor_table(), &[], &[], false, &mut diagnostics)
            .unwrap();

        assert_eq!(
            sheet.cell_at(0, 0).unwrap().content,
            CellContent::Text("Name".to_string())
        );
        assert_eq!(sheet.first_data_row, 1);
        assert_eq!(sheet.freeze, CellAddress::new(1, 0));
    }

    #[test]
    fn test_formulas_disabled_keep_values() {
        let engine = LayoutEngine::default().with_formulas(false);
        let mut diagnostics = Diagnostics::new();
        let sheet = engine
            .layout("Labor", &labor_table(), &[], &[], false, &mut diagnostics)
            .unwrap();
        assert_eq!(sheet.cell_at(1, 3).unwrap().content, CellContent::Number(0.0));
    }

    #[test]
    fn test_column_count_minimum_and_rules() {
        let table = ParsedTable {
            body_rows: vec![vec![td("a")]],
            ..ParsedTable::default()
        };
        let rules = [
            ColumnRule::width("B:C".parse().unwrap(), 20.0),
            ColumnRule::width("E".parse().unwrap(), 0.0),
        ];
        let mut diagnostics = Diagnostics::new();
        let sheet = LayoutEngine::default()
            .layout("s", &table, &["Title".to_string()], &rules, true, &mut diagnostics)
            .unwrap();

        assert_eq!(sheet.column_count, 2);
        assert_eq!(sheet.cells[0].last_col, 1);
        assert_eq!(sheet.columns.get(&1), Some(&ColumnSetting::Width(20.0)));
        assert_eq!(sheet.columns.get(&2), Some(&ColumnSetting::Width(20.0)));
        assert_eq!(sheet.columns.get(&4), Some(&ColumnSetting::Hidden));
        assert_eq!(sheet.columns.len(), 3);
    }

    #[test]
    fn test_freeze_directive() {
        let mut table = labor_table();
        table.layout_directive = Some("FREEZE 1,1".to_string());
        let mut diagnostics = Diagnostics::new();
        let sheet = LayoutEngine::default()
            .layout("s", &table, &[], &[], false, &mut diagnostics)
            .unwrap();
        assert_eq!(sheet.freeze, CellAddress::new(1, 1));
    }

    #[test]
    fn test_bad_freeze_directive() {
        let mut table = labor_table();
        table.layout_directive = Some("FREEZE top".to_string());

        let mut diagnostics = Diagnostics::new();
        let sheet = LayoutEngine::default()
            .layout("s", &table, &[], &[], false, &mut diagnostics)
            .unwrap();
        assert_eq!(sheet.freeze, CellAddress::new(1, 0));
        assert_eq!(diagnostics.len(), 1);

        let strict = LayoutEngine::default().with_strict(true);
        let result = strict.layout("s", &table, &[], &[], false, &mut Diagnostics::new());
        assert!(matches!(result, Err(ConvertError::Layout { .. })));
    }

    #[test]
    fn test_unknown_directive_keeps_value_and_warns() {
        let engine = LayoutEngine::default();
        let mut sheet = SheetLayout::new("s", 2);
        let mut diagnostics = Diagnostics::new();
        let cell = td("42").with_attribute("data-excel", "AVERAGE ROW A-C");

        engine
            .write_cell(&mut sheet, 2, 1, &cell, None, Some(1), &mut diagnostics)
            .unwrap();

        assert_eq!(sheet.cells[0].content, CellContent::Number(42.0));
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::Directive {
                sheet: "s".to_string(),
                cell: "B3".to_string(),
                problem: DirectiveError::Unknown("AVERAGE ROW A-C".to_string()),
            }]
        );
    }

    #[test]
    fn test_sum_col_in_first_data_row_keeps_value() {
        let table = ParsedTable {
            header_rows: vec![vec![th("Item"), th("Cost")]],
            footer_rows: vec![vec![
                td("Total"),
                td("5").with_attribute("data-excel", "SUM COL"),
            ]],
            ..ParsedTable::default()
        };
        let mut diagnostics = Diagnostics::new();
        let sheet = LayoutEngine::default()
            .layout("s", &table, &[], &[], false, &mut diagnostics)
            .unwrap();

        assert_eq!(sheet.cell_at(1, 1).unwrap().content, CellContent::Number(5.0));
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::Directive {
                sheet: "s".to_string(),
                cell: "B2".to_string(),
                problem: DirectiveError::NoRowsAbove { row: 1 },
            }]
        );
    }

    #[test]
    fn test_strict_directive_error() {
        let engine = LayoutEngine::default().with_strict(true);
        let mut sheet = SheetLayout::new("s", 2);
        let cell = td("0").with_attribute("data-excel", "SUM COL");

        let result = engine.write_cell(&mut sheet, 0, 0, &cell, None, None, &mut Diagnostics::new());
        assert!(matches!(
            result,
            Err(ConvertError::Directive { ref cell, .. }) if cell == "A1"
        ));
    }
}
