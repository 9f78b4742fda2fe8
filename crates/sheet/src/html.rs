//! HTML table parsing
//!
//! Walks a table's `<caption>`, `<thead>`, `<tbody>` and `<tfoot>` sections
//! and classifies every `<th>`/`<td>` cell. Colspans are recorded on the
//! cell and expanded later, at layout time.
//!
//! ## Limitations
//!
//! - **Text extraction**: text nodes are trimmed and concatenated without
//!   separators (e.g., `<b>foo</b> <i>bar</i>` becomes `"foobar"`).
//! - **Rowspan** is not interpreted.
//! - Rows directly under `<table>` are wrapped in a `<tbody>` by the HTML
//!   parser, so they count as body rows.

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::cell::{parse_colspan, CellRole, ParsedCell, DIRECTIVE_ATTR};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{ConvertError, Result};

/// Cells of one `<tr>`, in document order.
pub type ParsedRow = Vec<ParsedCell>;

/// One `<table>` after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub caption: Option<String>,
    pub header_rows: Vec<ParsedRow>,
    pub body_rows: Vec<ParsedRow>,
    pub footer_rows: Vec<ParsedRow>,
    /// The table's `id` attribute
    pub id: Option<String>,
    /// The table's `data-excel` attribute, read at layout time
    pub layout_directive: Option<String>,
}

impl ParsedTable {
    /// Widest header row, counted in cells before colspan expansion.
    pub fn header_width(&self) -> usize {
        self.header_rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Header, body and footer rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &ParsedRow> {
        self.header_rows
            .iter()
            .chain(&self.body_rows)
            .chain(&self.footer_rows)
    }

    fn label(&self) -> String {
        self.id
            .as_ref()
            .map_or_else(|| "(no id)".to_string(), |id| format!("'{id}'"))
    }
}

/// Parse a table element.
///
/// When `element` is not a `<table>` the first table below it is used.
/// A table without `<tbody>` gets an empty body and a warning, or fails with
/// [`ConvertError::MissingBody`] when `strict` is set.
pub fn parse_table(
    element: ElementRef<'_>,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<ParsedTable> {
    let table = if element.value().name() == "table" {
        element
    } else {
        let table_selector = Selector::parse("table").unwrap();
        element
            .select(&table_selector)
            .next()
            .ok_or(ConvertError::NoTable)?
    };

    let mut parsed = ParsedTable {
        id: table.value().attr("id").map(str::to_string),
        layout_directive: table
            .value()
            .attr(DIRECTIVE_ATTR)
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty()),
        ..ParsedTable::default()
    };

    let label = parsed.label();
    let mut has_body = false;
    for section in table.children().filter_map(ElementRef::wrap) {
        match section.value().name() {
            "caption" => {
                if parsed.caption.is_none() {
                    parsed.caption = Some(flatten_text(section)).filter(|s| !s.is_empty());
                }
            }
            "thead" => parse_rows(section, &mut parsed.header_rows, &label, diagnostics),
            "tbody" => {
                has_body = true;
                parse_rows(section, &mut parsed.body_rows, &label, diagnostics);
            }
            "tfoot" => parse_rows(section, &mut parsed.footer_rows, &label, diagnostics),
            _ => {}
        }
    }

    if !has_body {
        let table = label.clone();
        if strict {
            return Err(ConvertError::MissingBody { table });
        }
        diagnostics.warn(Warning::MissingBody { table });
    }

    tracing::debug!(
        table = %label,
        headers = parsed.header_rows.len(),
        rows = parsed.body_rows.len(),
        footers = parsed.footer_rows.len(),
        "parsed table"
    );

    Ok(parsed)
}

fn parse_rows(
    section: ElementRef<'_>,
    rows: &mut Vec<ParsedRow>,
    table: &str,
    diagnostics: &mut Diagnostics,
) {
    for row in section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
    {
        rows.push(parse_row(row, table, diagnostics));
    }
}

fn parse_row(row: ElementRef<'_>, table: &str, diagnostics: &mut Diagnostics) -> ParsedRow {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let role = CellRole::from_tag(cell.value().name())?;
            let attributes: IndexMap<String, String> = cell
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            if let Some(value) = attributes.get("colspan") {
                if parse_colspan(value).is_none() {
                    diagnostics.warn(Warning::InvalidColspan {
                        table: table.to_string(),
                        value: value.clone(),
                    });
                }
            }
            Some(ParsedCell::from_parts(flatten_text(cell), role, attributes))
        })
        .collect()
}

/// Trimmed descendant text nodes, concatenated.
fn flatten_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse every table in a page, skipping tables whose `id` is excluded.
pub fn parse_document(
    html: &str,
    excluded_tables: &[String],
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ParsedTable>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();

    let mut tables = Vec::new();
    for table in document.select(&table_selector) {
        if is_excluded(table, excluded_tables) {
            continue;
        }
        tables.push(parse_table(table, strict, diagnostics)?);
    }
    Ok(tables)
}

fn is_excluded(table: ElementRef<'_>, excluded_tables: &[String]) -> bool {
    let Some(id) = table.value().attr("id") else {
        return false;
    };
    let excluded = excluded_tables.iter().any(|excluded| excluded == id);
    if excluded {
        tracing::debug!(id, "skipping excluded table");
    }
    excluded
}

/// Parse a list of table fragments (each one table's outer HTML), skipping
/// fragments whose table `id` is excluded.
pub fn parse_fragments<S: AsRef<str>>(
    fragments: &[S],
    excluded_tables: &[String],
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ParsedTable>> {
    let table_selector = Selector::parse("table").unwrap();

    let mut tables = Vec::new();
    for fragment in fragments {
        let document = Html::parse_fragment(fragment.as_ref());
        let root = document.root_element();
        if let Some(table) = root.select(&table_selector).next() {
            if is_excluded(table, excluded_tables) {
                continue;
            }
        }
        tables.push(parse_table(root, strict, diagnostics)?);
    }
    Ok(tables)
}

/// Parse a JSON array of table fragments.
pub fn parse_fragments_json(
    json: &str,
    excluded_tables: &[String],
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ParsedTable>> {
    let fragments: Vec<String> = serde_json::from_str(json)?;
    parse_fragments(&fragments, excluded_tables, strict, diagnostics)
}
