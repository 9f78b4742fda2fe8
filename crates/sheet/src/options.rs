use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabxl_primitives::ColumnSpan;

use crate::format::FormatSpec;

/// Width or visibility for a span of columns.
///
/// A width of `0` (or less) hides the columns, same as `hidden: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub columns: ColumnSpan,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub hidden: bool,
}

impl ColumnRule {
    pub fn width(columns: ColumnSpan, width: f64) -> Self {
        Self {
            columns,
            width: Some(width),
            hidden: false,
        }
    }

    pub fn hidden(columns: ColumnSpan) -> Self {
        Self {
            columns,
            width: None,
            hidden: true,
        }
    }

    /// What the rule does to each of its columns, if anything.
    pub fn setting(&self) -> Option<ColumnSetting> {
        match self.width {
            _ if self.hidden => Some(ColumnSetting::Hidden),
            Some(width) if width <= 0.0 => Some(ColumnSetting::Hidden),
            Some(width) => Some(ColumnSetting::Width(width)),
            None => None,
        }
    }
}

/// Resolved per-column setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColumnSetting {
    Width(f64),
    Hidden,
}

/// Options for one conversion run.
///
/// Per-table lists are indexed by table position (after exclusion) and may be
/// shorter than the number of tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Worksheet names; missing entries become `sheet_<n>`
    pub sheet_names: Vec<String>,
    /// Page header lines written above each table, merged across the sheet.
    /// For CSV output each entry is one row at the top of the file.
    pub extra_headers: Vec<Vec<String>>,
    pub column_widths: Vec<Vec<ColumnRule>>,
    /// Extra named formats, overriding built-ins of the same name
    pub custom_formats: IndexMap<String, FormatSpec>,
    /// Whether to write each table's caption; missing entries mean `true`
    pub show_captions: Vec<bool>,
    /// When false, `data-excel` formulas are ignored and literal values kept
    pub include_formulas: bool,
    /// Ids of tables to skip
    pub excluded_tables: Vec<String>,
    /// Fail on directive problems and missing `<tbody>` instead of warning
    pub strict: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            sheet_names: Vec::new(),
            extra_headers: Vec::new(),
            column_widths: Vec::new(),
            custom_formats: IndexMap::new(),
            show_captions: Vec::new(),
            include_formulas: true,
            excluded_tables: Vec::new(),
            strict: false,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sheet_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sheet_names = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_excluded_tables<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tables = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_formulas(mut self, include_formulas: bool) -> Self {
        self.include_formulas = include_formulas;
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Worksheet name for the table at `index`.
    pub fn sheet_name(&self, index: usize) -> String {
        self.sheet_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("sheet_{}", index + 1))
    }

    pub fn extra_headers_for(&self, index: usize) -> &[String] {
        self.extra_headers.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn column_rules_for(&self, index: usize) -> &[ColumnRule] {
        self.column_widths.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn show_caption(&self, index: usize) -> bool {
        self.show_captions.get(index).copied().unwrap_or(true)
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_tables.iter().any(|excluded| excluded == id)
    }
}
