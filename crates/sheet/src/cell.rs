use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute carrying formula (on cells) and layout (on tables) directives.
pub const DIRECTIVE_ATTR: &str = "data-excel";

/// A cell value after classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Display category inferred from a cell's text. Drives default formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    #[default]
    Plain,
    Money,
    Percent,
}

/// Structural role of a cell, from its tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    /// `<th>`
    Header,
    /// `<td>`
    #[default]
    Data,
}

impl CellRole {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "th" => Some(CellRole::Header),
            "td" => Some(CellRole::Data),
            _ => None,
        }
    }

    /// Tag name, which doubles as the role's default format name.
    pub fn tag(self) -> &'static str {
        match self {
            CellRole::Header => "th",
            CellRole::Data => "td",
        }
    }
}

/// Outcome of classifying a cell's text.
///
/// Classification never fails: anything that does not read as a number is
/// kept as `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Money(f64),
    Percent(f64),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Classification {
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            Classification::Money(_) => SemanticType::Money,
            Classification::Percent(_) => SemanticType::Percent,
            _ => SemanticType::Plain,
        }
    }

    pub fn into_value(self) -> CellValue {
        match self {
            Classification::Money(v) | Classification::Percent(v) | Classification::Float(v) => {
                CellValue::Float(v)
            }
            Classification::Integer(i) => CellValue::Int(i),
            Classification::Text(s) => CellValue::Text(s),
        }
    }
}

/// Classify a cell's flattened, trimmed text.
///
/// - `$1,234.56` is money (`1234.56`); if the rest is not a number the value
///   is the text with `$` and commas removed (`$abc` -> `abc`)
/// - `12.5%` is a percentage stored as a fraction (`0.125`); otherwise the
///   original text including `%` is kept
/// - all-digit text is an integer, other numeric text (commas allowed) a float
pub fn classify(text: &str) -> Classification {
    let text = text.trim();
    if text.is_empty() {
        return Classification::Text(String::new());
    }

    if let Some(rest) = text.strip_prefix('$') {
        let stripped = rest.replace(',', "");
        return match parse_number(&stripped) {
            Some(value) => Classification::Money(value),
            None => Classification::Text(stripped),
        };
    }

    if let Some(rest) = text.strip_suffix('%') {
        return match parse_number(rest) {
            Some(value) => Classification::Percent(value / 100.0),
            None => Classification::Text(text.to_string()),
        };
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = text.parse::<i64>() {
            return Classification::Integer(i);
        }
    }

    match parse_number(&text.replace(',', "")) {
        Some(value) => Classification::Float(value),
        None => Classification::Text(text.to_string()),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an inline `style` attribute into ordered declarations.
///
/// Declarations without exactly one `:` are skipped.
pub fn parse_style(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| {
            let mut parts = declaration.split(':');
            let key = parts.next()?.trim();
            let value = parts.next()?.trim();
            if parts.next().is_some() || key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse a `colspan` value. Only positive integers are accepted.
pub fn parse_colspan(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|&n| n > 0)
}

/// One table cell after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCell {
    /// Flattened, trimmed text content
    pub text: String,
    pub value: CellValue,
    pub semantic_type: SemanticType,
    /// Non-empty tokens of the `class` attribute, in attribute order
    pub classes: Vec<String>,
    /// Declarations of the `style` attribute
    pub style: IndexMap<String, String>,
    /// Every attribute as written in the markup
    pub attributes: IndexMap<String, String>,
    pub role: CellRole,
    pub colspan: u16,
}

impl ParsedCell {
    /// Classify `text` and build a cell without attributes.
    pub fn new(text: impl Into<String>, role: CellRole) -> Self {
        Self::from_parts(text, role, IndexMap::new())
    }

    pub fn from_parts(
        text: impl Into<String>,
        role: CellRole,
        attributes: IndexMap<String, String>,
    ) -> Self {
        let text = text.into();
        let classification = classify(&text);
        let mut cell = Self {
            text,
            semantic_type: classification.semantic_type(),
            value: classification.into_value(),
            classes: Vec::new(),
            style: IndexMap::new(),
            attributes,
            role,
            colspan: 1,
        };
        cell.refresh_attributes();
        cell
    }

    /// Add or replace an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self.refresh_attributes();
        self
    }

    fn refresh_attributes(&mut self) {
        self.classes = self
            .attributes
            .get("class")
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        self.style = self
            .attributes
            .get("style")
            .map(|style| parse_style(style))
            .unwrap_or_default();
        self.colspan = self
            .attributes
            .get("colspan")
            .and_then(|value| parse_colspan(value))
            .unwrap_or(1);
    }

    /// The cell's formula directive, if any.
    pub fn formula_directive(&self) -> Option<&str> {
        self.attributes
            .get(DIRECTIVE_ATTR)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Text as exported to CSV: the leading `$` is dropped, nothing else.
    pub fn csv_text(&self) -> &str {
        self.text.strip_prefix('$').unwrap_or(&self.text)
    }
}
