//! Named cell formats
//!
//! Formats are described by [`FormatSpec`] (plain data, loadable from a config
//! file) and only turned into `rust_xlsxwriter::Format` values when a workbook
//! is written. Cells pick a format by CSS class, then by semantic type, then
//! by a default chosen by the layout engine.

use std::collections::HashMap;

use indexmap::IndexMap;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline};
use serde::{Deserialize, Serialize};

use crate::cell::{ParsedCell, SemanticType};

pub const MONEY: &str = "money";
pub const DOLLARS: &str = "dollars";
pub const HOURS: &str = "hours";
pub const PERCENT: &str = "percent";
pub const INTEGER: &str = "integer";
pub const HEADER: &str = "header";
pub const CENTERED_HEADER: &str = "centered_header";
pub const RIGHT_HEADER: &str = "right_header";
pub const UPPER_HEADER: &str = "upper_header";
pub const BOLD: &str = "bold";
pub const UNDERLINE: &str = "underline";
pub const TITLE: &str = "title";
pub const URL: &str = "url";
pub const RIGHT_ALIGN: &str = "right_align";
pub const DATE: &str = "date";

/// Horizontal alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
    CenterAcross,
}

impl From<Align> for FormatAlign {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => FormatAlign::Left,
            Align::Center => FormatAlign::Center,
            Align::Right => FormatAlign::Right,
            Align::CenterAcross => FormatAlign::CenterAcross,
        }
    }
}

/// A cell format as data.
///
/// Colors are `#RRGGBB` or one of the basic color names (`black`, `blue`,
/// `red`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSpec {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,
    pub bg_color: Option<String>,
    pub num_format: Option<String>,
    pub align: Option<Align>,
    /// Thin bottom border
    pub border_bottom: bool,
    pub bottom_color: Option<String>,
}

impl FormatSpec {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    #[must_use]
    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    #[must_use]
    pub fn font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn num_format(mut self, num_format: impl Into<String>) -> Self {
        self.num_format = Some(num_format.into());
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    #[must_use]
    pub fn border_bottom(mut self, color: impl Into<String>) -> Self {
        self.border_bottom = true;
        self.bottom_color = Some(color.into());
        self
    }

    /// True when the spec sets nothing, i.e. the cell is written unformatted.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Build the xlsx format. Unrecognized colors are skipped with a warning.
    pub fn to_format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if self.italic {
            format = format.set_italic();
        }
        if self.underline {
            format = format.set_underline(FormatUnderline::Single);
        }
        if let Some(size) = self.font_size {
            format = format.set_font_size(size);
        }
        if let Some(color) = self.font_color.as_deref().and_then(color_or_warn) {
            format = format.set_font_color(color);
        }
        if let Some(color) = self.bg_color.as_deref().and_then(color_or_warn) {
            format = format.set_background_color(color);
        }
        if let Some(num_format) = &self.num_format {
            format = format.set_num_format(num_format);
        }
        if let Some(align) = self.align {
            format = format.set_align(align.into());
        }
        if self.border_bottom {
            format = format.set_border_bottom(FormatBorder::Thin);
            if let Some(color) = self.bottom_color.as_deref().and_then(color_or_warn) {
                format = format.set_border_bottom_color(color);
            }
        }
        format
    }
}

/// Parse `#RRGGBB` (the `#` is optional) or a basic color name.
pub fn parse_color(color: &str) -> Option<Color> {
    let color = color.trim();
    let named = match color.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "blue" => Some(Color::Blue),
        "brown" => Some(Color::Brown),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "green" => Some(Color::Green),
        "lime" => Some(Color::Lime),
        "magenta" => Some(Color::Magenta),
        "navy" => Some(Color::Navy),
        "orange" => Some(Color::Orange),
        "pink" => Some(Color::Pink),
        "purple" => Some(Color::Purple),
        "red" => Some(Color::Red),
        "silver" => Some(Color::Silver),
        "white" => Some(Color::White),
        "yellow" => Some(Color::Yellow),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(Color::RGB)
}

fn color_or_warn(color: &str) -> Option<Color> {
    let parsed = parse_color(color);
    if parsed.is_none() {
        tracing::warn!(color, "ignoring unrecognized color");
    }
    parsed
}

/// Format names to specs, built once per conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatRegistry {
    formats: IndexMap<String, FormatSpec>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    /// The built-in formats.
    pub fn builtin() -> Self {
        let header = || {
            FormatSpec::new()
                .bold()
                .bg_color("#CCCCCC")
                .border_bottom("black")
        };

        let formats = [
            (MONEY, FormatSpec::new().num_format("$#,##0.00").align(Align::Right)),
            (DOLLARS, FormatSpec::new().num_format("$#,##0").align(Align::Right)),
            (HOURS, FormatSpec::new().num_format("#,##0.0").align(Align::Right)),
            (PERCENT, FormatSpec::new().num_format("0.00%").align(Align::Right)),
            (INTEGER, FormatSpec::new().num_format("#,##0").align(Align::Right)),
            (HEADER, header()),
            (CENTERED_HEADER, header().align(Align::CenterAcross)),
            (RIGHT_HEADER, header().align(Align::Right)),
            (UPPER_HEADER, FormatSpec::new().bold().bg_color("#CCCCCC")),
            (BOLD, FormatSpec::new().bold()),
            (UNDERLINE, FormatSpec::new().underline()),
            (TITLE, FormatSpec::new().bold().font_size(13.0)),
            (URL, FormatSpec::new().font_color("blue").underline()),
            (RIGHT_ALIGN, FormatSpec::new().align(Align::Right)),
            (DATE, FormatSpec::new().num_format("D-MMM")),
            ("th", FormatSpec::new().bold()),
            ("td", FormatSpec::new()),
        ];

        Self {
            formats: formats
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        }
    }

    /// Built-ins plus `custom`, which wins on name collisions.
    pub fn with_custom(custom: &IndexMap<String, FormatSpec>) -> Self {
        let mut registry = Self::builtin();
        for (name, spec) in custom {
            registry.insert(name.clone(), spec.clone());
        }
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: FormatSpec) {
        self.formats.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&FormatSpec> {
        self.formats.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Pick the format name for a cell.
    ///
    /// The first of the cell's classes that names a format wins, then the
    /// money/percent format for the cell's semantic type, then `default`.
    pub fn resolve<'a>(&'a self, cell: &ParsedCell, default: Option<&'a str>) -> Option<&'a str> {
        if let Some((name, _)) = cell
            .classes
            .iter()
            .find_map(|class| self.formats.get_key_value(class.as_str()))
        {
            return Some(name.as_str());
        }

        match cell.semantic_type {
            SemanticType::Money => Some(MONEY),
            SemanticType::Percent => Some(PERCENT),
            SemanticType::Plain => default,
        }
    }

    /// Build xlsx formats for every non-empty spec.
    pub fn build(&self) -> HashMap<String, Format> {
        self.formats
            .iter()
            .filter(|(_, spec)| !spec.is_empty())
            .map(|(name, spec)| (name.clone(), spec.to_format()))
            .collect()
    }
}
