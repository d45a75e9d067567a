//! Interval maps: sparse per-character style attributes over a text.

use std::fmt;

/// Value carried by one interval map item.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MapValue {
    /// Boolean flag (bold, italic, underline).
    Bool(bool),
    /// Numeric value (line index, opacity, weight).
    Number(f64),
    /// String value (CSS color, link target, line tag).
    Text(String),
}

impl MapValue {
    /// Interpret as a flag: numbers are true when non-zero, strings when `"true"`.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }

    /// Numeric view; numeric strings parse.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(_) => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for MapValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for MapValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for MapValue {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<String> for MapValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for MapValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// One interval: the attribute holds `value` for characters `start_index..=end_index`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMapItem {
    /// First covered character (0-based, inclusive).
    pub start_index: i64,
    /// Last covered character (inclusive).
    pub end_index: i64,
    /// Attribute value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MapValue>,
    /// Optional item tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TextMapItem {
    /// Build an untagged item.
    pub fn new(start_index: i64, end_index: i64, value: impl Into<MapValue>) -> Self {
        Self {
            start_index,
            end_index,
            value: Some(value.into()),
            kind: None,
        }
    }

    /// Attach an item tag.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Return `true` when `index` lies inside this interval.
    pub fn contains(&self, index: i64) -> bool {
        self.start_index <= index && index <= self.end_index
    }
}

/// Convert a per-character value array into interval form.
///
/// Equal consecutive values merge into one item; an empty input yields an empty map.
pub fn build_interval_map<T>(values: &[T]) -> Vec<TextMapItem>
where
    T: Clone + PartialEq + Into<MapValue>,
{
    let mut out = Vec::new();
    let mut start = 0usize;
    for i in 1..=values.len() {
        if i == values.len() || values[i] != values[start] {
            out.push(TextMapItem::new(
                start as i64,
                i as i64 - 1,
                values[start].clone(),
            ));
            start = i;
        }
    }
    out
}

/// Find the item that applies at character `index`.
///
/// Items may overlap and need not be ordered; the last matching item in the list wins.
pub fn lookup_interval(map: &[TextMapItem], index: usize) -> Option<&TextMapItem> {
    let index = index as i64;
    map.iter().rev().find(|item| item.contains(index))
}

/// Value that applies at `index`, if any.
pub fn value_at(map: &[TextMapItem], index: usize) -> Option<&MapValue> {
    lookup_interval(map, index).and_then(|item| item.value.as_ref())
}

#[cfg(test)]
#[path = "../../tests/unit/document/map.rs"]
mod tests;
