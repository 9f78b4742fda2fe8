//! Plain CSV export of whole pages.
//!
//! Every table contributes its caption, header, body and footer rows followed
//! by an empty separator row. Cells are written as their cleaned text with a
//! leading `$` removed, and a cell spanning `n` columns is preceded by `n - 1`
//! empty fields so values line up under their header.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cell::ParsedCell;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::html::{parse_document, parse_fragments, ParsedTable};
use crate::options::ConvertOptions;

/// A CSV row
pub type CsvRow = Vec<String>;

/// Rows for one table, separator included.
pub fn table_rows(table: &ParsedTable, show_caption: bool) -> Vec<CsvRow> {
    let mut rows = Vec::new();
    if show_caption {
        if let Some(caption) = &table.caption {
            rows.push(vec![caption.clone()]);
        }
    }
    rows.extend(table.rows().map(|row| row_fields(row)));
    rows.push(Vec::new());
    rows
}

fn row_fields(row: &[ParsedCell]) -> CsvRow {
    let mut fields = Vec::with_capacity(row.len());
    for cell in row {
        fields.resize(fields.len() + usize::from(cell.colspan) - 1, String::new());
        fields.push(cell.csv_text().to_string());
    }
    fields
}

/// Rows for all tables, after the option's extra header rows.
pub fn csv_rows(tables: &[ParsedTable], options: &ConvertOptions) -> Vec<CsvRow> {
    let mut rows: Vec<CsvRow> = options.extra_headers.clone();
    for (i, table) in tables.iter().enumerate() {
        rows.extend(table_rows(table, options.show_caption(i)));
    }
    rows
}

/// Write rows as CSV. Rows may have different lengths.
pub fn write_csv<W: Write>(writer: W, rows: &[CsvRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    for row in rows {
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn save_rows<P: AsRef<Path>>(path: P, rows: &[CsvRow]) -> Result<()> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), rows)
}

/// Convert every non-excluded table in a page to CSV at `path`.
///
/// Returns the rows written.
pub fn page_to_csv<P: AsRef<Path>>(
    path: P,
    html: &str,
    options: &ConvertOptions,
) -> Result<Vec<CsvRow>> {
    let mut diagnostics = Diagnostics::new();
    let tables = parse_document(html, &options.excluded_tables, options.strict, &mut diagnostics)?;
    let rows = csv_rows(&tables, options);
    save_rows(path, &rows)?;
    tracing::debug!(tables = tables.len(), rows = rows.len(), "wrote csv");
    Ok(rows)
}

/// Convert a list of table fragments to CSV at `path`.
pub fn fragments_to_csv<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    fragments: &[S],
    options: &ConvertOptions,
) -> Result<Vec<CsvRow>> {
    let mut diagnostics = Diagnostics::new();
    let tables = parse_fragments(
        fragments,
        &options.excluded_tables,
        options.strict,
        &mut diagnostics,
    )?;
    let rows = csv_rows(&tables, options);
    save_rows(path, &rows)?;
    Ok(rows)
}
