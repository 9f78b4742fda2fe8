use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{ConvertError, Result};
use crate::html::{parse_document, parse_fragments, ParsedTable};
use crate::layout::{CellContent, LayoutEngine, PlacedCell, SheetLayout};
use crate::options::{ColumnSetting, ConvertOptions};

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Worksheet names, in the order they were written
    pub sheets: Vec<String>,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

/// Writes parsed tables as worksheets, one sheet per table.
#[derive(Debug, Clone)]
pub struct WorkbookWriter {
    engine: LayoutEngine,
    options: ConvertOptions,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

impl WorkbookWriter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            engine: LayoutEngine::from_options(&options),
            options,
        }
    }

    /// Lay out every table without writing anything.
    ///
    /// All layouts are built before any worksheet is touched, so a strict-mode
    /// failure leaves the target workbook unchanged.
    pub fn layout(
        &self,
        tables: &[ParsedTable],
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<SheetLayout>> {
        let names: Vec<String> = (0..tables.len()).map(|i| self.options.sheet_name(i)).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].iter().any(|other| other.eq_ignore_ascii_case(name)) {
                return Err(ConvertError::Options(format!("duplicate worksheet name '{name}'")));
            }
        }

        tables
            .iter()
            .zip(&names)
            .enumerate()
            .map(|(i, (table, name))| {
                self.engine.layout(
                    name,
                    table,
                    self.options.extra_headers_for(i),
                    self.options.column_rules_for(i),
                    self.options.show_caption(i),
                    diagnostics,
                )
            })
            .collect()
    }

    /// Append worksheets to a workbook owned by the caller.
    ///
    /// Every worksheet is rendered before any is added, so on error the
    /// workbook is left as it was. The workbook is not saved; that stays with
    /// the caller.
    pub fn write_into(
        &self,
        workbook: &mut Workbook,
        tables: &[ParsedTable],
    ) -> Result<ConversionReport> {
        let mut diagnostics = Diagnostics::new();
        let layouts = self.layout(tables, &mut diagnostics)?;
        let formats = self.engine.registry().build();

        let worksheets = layouts
            .iter()
            .map(|layout| {
                let mut worksheet = Worksheet::new();
                emit_sheet(&mut worksheet, layout, &formats)?;
                Ok(worksheet)
            })
            .collect::<Result<Vec<_>>>()?;

        for worksheet in worksheets {
            workbook.push_worksheet(worksheet);
        }
        let sheets: Vec<String> = layouts.into_iter().map(|layout| layout.name).collect();

        tracing::debug!(sheets = sheets.len(), "wrote worksheets");

        Ok(ConversionReport {
            sheets,
            warnings: diagnostics.into_warnings(),
        })
    }

    /// Write a new workbook to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, tables: &[ParsedTable]) -> Result<ConversionReport> {
        let mut workbook = Workbook::new();
        let report = self.write_into(&mut workbook, tables)?;
        workbook.save(path.as_ref())?;
        Ok(report)
    }

    /// Write a new workbook into memory.
    pub fn save_to_buffer(&self, tables: &[ParsedTable]) -> Result<(Vec<u8>, ConversionReport)> {
        let mut workbook = Workbook::new();
        let report = self.write_into(&mut workbook, tables)?;
        let buffer = workbook.save_to_buffer()?;
        Ok((buffer, report))
    }
}

/// Render a layout onto a worksheet.
pub fn emit_sheet(
    worksheet: &mut Worksheet,
    layout: &SheetLayout,
    formats: &HashMap<String, Format>,
) -> Result<()> {
    worksheet.set_name(&layout.name)?;

    for (&col, setting) in &layout.columns {
        match setting {
            ColumnSetting::Width(width) => {
                worksheet.set_column_width(col, *width)?;
            }
            ColumnSetting::Hidden => {
                worksheet.set_column_hidden(col)?;
            }
        }
    }

    let plain = Format::new();
    for cell in &layout.cells {
        let format = cell.format.as_deref().and_then(|name| formats.get(name));
        if cell.is_merged() {
            emit_merged(worksheet, cell, format.unwrap_or(&plain))?;
        } else {
            emit_cell(worksheet, cell, format)?;
        }
    }

    if layout.freeze.row > 0 || layout.freeze.col > 0 {
        worksheet.set_freeze_panes(layout.freeze.row, layout.freeze.col)?;
    }

    Ok(())
}

fn emit_cell(worksheet: &mut Worksheet, cell: &PlacedCell, format: Option<&Format>) -> Result<()> {
    let (row, col) = (cell.row, cell.col);
    match (&cell.content, format) {
        (CellContent::Blank, None) => {}
        (CellContent::Blank, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellContent::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellContent::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellContent::Text(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellContent::Text(s), Some(format)) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        (CellContent::Formula(f), None) => {
            worksheet.write_formula(row, col, f.as_str())?;
        }
        (CellContent::Formula(f), Some(format)) => {
            worksheet.write_formula_with_format(row, col, f.as_str(), format)?;
        }
    }
    Ok(())
}

/// Merge the range, then overwrite the anchor so numbers and formulas stay
/// typed.
fn emit_merged(worksheet: &mut Worksheet, cell: &PlacedCell, format: &Format) -> Result<()> {
    let (row, col) = (cell.row, cell.col);
    let text = match &cell.content {
        CellContent::Text(s) => s.as_str(),
        _ => "",
    };
    worksheet.merge_range(row, col, row, cell.last_col, text, format)?;

    match &cell.content {
        CellContent::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellContent::Formula(f) => {
            worksheet.write_formula_with_format(row, col, f.as_str(), format)?;
        }
        CellContent::Blank | CellContent::Text(_) => {}
    }
    Ok(())
}

/// Convert every table in an HTML page to a workbook at `path`.
///
/// Tables whose `id` is in `options.excluded_tables` are skipped.
pub fn full_page_to_excel<P: AsRef<Path>>(
    path: P,
    html: &str,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let mut diagnostics = Diagnostics::new();
    let tables = parse_document(html, &options.excluded_tables, options.strict, &mut diagnostics)?;
    let report = WorkbookWriter::new(options.clone()).save(path, &tables)?;
    Ok(prepend_warnings(report, diagnostics))
}

/// Convert a list of table fragments (one table's HTML each) to a workbook.
///
/// Fragments whose table `id` is in `options.excluded_tables` are skipped.
pub fn fragments_to_excel<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    fragments: &[S],
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let mut diagnostics = Diagnostics::new();
    let tables = parse_fragments(
        fragments,
        &options.excluded_tables,
        options.strict,
        &mut diagnostics,
    )?;
    let report = WorkbookWriter::new(options.clone()).save(path, &tables)?;
    Ok(prepend_warnings(report, diagnostics))
}

fn prepend_warnings(mut report: ConversionReport, parsing: Diagnostics) -> ConversionReport {
    let mut warnings = parsing.into_warnings();
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_fragments;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use std::fs::File;
    use std::io::BufReader;
    use tempfile::tempdir;

    const LABOR: &str = r#"
        <table id="labor">
            <caption>Labor</caption>
            <thead><tr><th>Name</th><th>Hours</th><th>Rate</th><th>Total</th></tr></thead>
            <tbody>
                <tr><td>Alice</td><td>10</td><td>$20.00</td>
                    <td data-excel="FORMULA RELATIVE colm002rowp000*colm001rowp000">200</td></tr>
                <tr><td>Bob</td><td>5</td><td>$30.00</td>
                    <td data-excel="FORMULA RELATIVE colm002rowp000*colm001rowp000">150</td></tr>
            </tbody>
            <tfoot>
                <tr><td colspan="3">Total</td><td data-excel="SUM COL">350</td></tr>
            </tfoot>
        </table>
    "#;

    fn tables(fragments: &[&str]) -> Vec<ParsedTable> {
        parse_fragments(fragments, &[], false, &mut Diagnostics::new()).unwrap()
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labor.xlsx");

        let writer = WorkbookWriter::new(ConvertOptions::new().with_sheet_names(["Labor"]));
        let report = writer.save(&path, &tables(&[LABOR])).unwrap();
        assert_eq!(report.sheets, vec!["Labor"]);
        assert!(report.warnings.is_empty());

        let mut workbook: Xlsx<BufReader<File>> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Labor".to_string()]);

        let range = workbook.worksheet_range("Labor").unwrap();
        // Caption on row 0, spacer on row 1, headers on row 2
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Labor".to_string())));
        assert_eq!(range.get_value((2, 3)), Some(&Data::String("Total".to_string())));
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("Alice".to_string())));
        assert_eq!(range.get_value((3, 2)), Some(&Data::Float(20.0)));
        assert_eq!(range.get_value((5, 0)), Some(&Data::String("Total".to_string())));

        let formulas = workbook.worksheet_formula("Labor").unwrap();
        assert_eq!(formulas.get_value((3, 3)), Some(&"B4*C4".to_string()));
        assert_eq!(formulas.get_value((5, 3)), Some(&"SUM(D4:D5)".to_string()));
    }

    #[test]
    fn test_save_to_buffer() {
        let writer = WorkbookWriter::default();
        let (buffer, report) = writer.save_to_buffer(&tables(&[LABOR, LABOR])).unwrap();
        assert!(buffer.starts_with(b"PK"));
        assert_eq!(report.sheets, vec!["sheet_1", "sheet_2"]);
    }

    #[test]
    fn test_write_into_caller_workbook() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("combined.xlsx");

        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name("Summary")
            .unwrap()
            .write_string(0, 0, "existing")
            .unwrap();

        let writer = WorkbookWriter::new(ConvertOptions::new().with_sheet_names(["Labor"]));
        writer.write_into(&mut workbook, &tables(&[LABOR])).unwrap();
        workbook.save(&path).unwrap();

        let workbook: Xlsx<BufReader<File>> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Summary".to_string(), "Labor".to_string()]
        );
    }

    #[test]
    fn test_write_into_failure_leaves_caller_workbook_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unchanged.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Summary").unwrap();

        let options = ConvertOptions::new().with_sheet_names(["Good", "Bad/Name"]);
        let writer = WorkbookWriter::new(options);
        let result = writer.write_into(&mut workbook, &tables(&[LABOR, LABOR]));
        assert!(matches!(result, Err(ConvertError::Xlsx(_))));

        workbook.save(&path).unwrap();
        let workbook: Xlsx<BufReader<File>> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Summary".to_string()]);
    }

    #[test]
    fn test_duplicate_sheet_names() {
        let writer = WorkbookWriter::new(ConvertOptions::new().with_sheet_names(["Data", "data"]));
        let result = writer.save_to_buffer(&tables(&[LABOR, LABOR]));
        assert!(matches!(result, Err(ConvertError::Options(_))));
    }

    #[test]
    fn test_formulas_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.xlsx");

        let writer = WorkbookWriter::new(ConvertOptions::new().with_formulas(false));
        writer.save(&path, &tables(&[LABOR])).unwrap();

        let mut workbook: Xlsx<BufReader<File>> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("sheet_1").unwrap();
        assert_eq!(range.get_value((3, 3)), Some(&Data::Float(200.0)));
        assert_eq!(range.get_value((5, 3)), Some(&Data::Float(350.0)));
    }

    #[test]
    fn test_full_page_to_excel_reports_parse_warnings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("page.xlsx");
        let html = format!(
            "<html><body>{LABOR}<table id='notes'><thead><tr><th>Note</th></tr></thead></table></body></html>"
        );

        let report = full_page_to_excel(&path, &html, &ConvertOptions::default()).unwrap();
        assert_eq!(report.sheets, vec!["sheet_1", "sheet_2"]);
        assert_eq!(
            report.warnings,
            vec![Warning::MissingBody {
                table: "'notes'".to_string()
            }]
        );
    }
}
