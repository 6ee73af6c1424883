// src/table/field_kind.rs
use chrono::NaiveDate;
use serde::{
    de::{self, Deserializer},
    Deserialize, Serialize,
};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use super::definitions::Value;

/// The kind of value a field holds. Drives coercion of raw input and structural validation.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Date,
    Enum { choices: Vec<String> },
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "Text"),
            FieldKind::Number { min, max } => match (min, max) {
                (None, None) => write!(f, "Number"),
                _ => write!(
                    f,
                    "Number[{}..{}]",
                    min.map(|v| v.to_string()).unwrap_or_default(),
                    max.map(|v| v.to_string()).unwrap_or_default()
                ),
            },
            FieldKind::Date => write!(f, "Date"),
            FieldKind::Enum { choices } => write!(f, "Enum({})", choices.join("|")),
        }
    }
}

// Accepts the tagged object form as well as bare kind names ("text", "f64", "Date", ...)
impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Some(s) = value.as_str() {
            return parse_field_kind(s)
                .ok_or_else(|| de::Error::custom(format!("Unknown FieldKind '{}'", s)));
        }
        let Some(obj) = value.as_object() else {
            return Err(de::Error::custom(format!(
                "FieldKind must be a string or object, got {}",
                value
            )));
        };
        let tag = obj
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| de::Error::custom("FieldKind object is missing 'type'"))?;
        match parse_field_kind(tag) {
            Some(FieldKind::Number { .. }) => {
                let bound = |key: &str| obj.get(key).and_then(|v| v.as_f64());
                Ok(FieldKind::Number {
                    min: bound("min"),
                    max: bound("max"),
                })
            }
            Some(kind) => Ok(kind),
            None if tag.eq_ignore_ascii_case("enum") || tag.eq_ignore_ascii_case("choice") => {
                let choices: Vec<String> = obj
                    .get("choices")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| de::Error::custom(format!("Invalid enum choices: {}", e)))?
                    .unwrap_or_default();
                if choices.is_empty() {
                    return Err(de::Error::custom("Enum field needs at least one choice"));
                }
                Ok(FieldKind::Enum { choices })
            }
            None => Err(de::Error::custom(format!("Unknown FieldKind '{}'", tag))),
        }
    }
}

/// Parses a bare kind name. Enum kinds need choices and are not reachable from a name alone.
pub fn parse_field_kind(s: &str) -> Option<FieldKind> {
    match s.trim() {
        "Text" | "text" | "String" | "string" | "OptionString" | "Option<String>" => {
            Some(FieldKind::Text)
        }
        "Number" | "number" | "F64" | "f64" | "Float" | "float" | "I64" | "i64" | "Int"
        | "int" | "OptionF64" | "OptionI64" => Some(FieldKind::Number {
            min: None,
            max: None,
        }),
        "Date" | "date" | "NaiveDate" => Some(FieldKind::Date),
        _ => None,
    }
}

/// Comparison form for enum choices: NFC, trimmed, lowercase.
pub fn normalize_for_choice_cmp(s: &str) -> String {
    s.trim().nfc().collect::<String>().to_lowercase()
}

impl FieldKind {
    /// Whether a value's variant is structurally valid for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldKind::Text, Value::Text(_))
                | (FieldKind::Number { .. }, Value::Number(_))
                | (FieldKind::Date, Value::Date(_))
                | (FieldKind::Enum { .. }, Value::Choice(_))
        )
    }

    /// Finds the canonical spelling of a choice, if it is allowed.
    pub fn match_choice(&self, raw: &str) -> Option<&str> {
        let FieldKind::Enum { choices } = self else {
            return None;
        };
        let needle = normalize_for_choice_cmp(raw);
        choices
            .iter()
            .find(|c| normalize_for_choice_cmp(c) == needle)
            .map(|c| c.as_str())
    }

    /// Coerces raw user input into a typed value.
    ///
    /// Blank input becomes `None`. Input that cannot be read as this kind is kept as
    /// `Value::Unparsable` so validation fails on it instead of the edit being lost.
    pub fn coerce(&self, raw: &str, date_formats: &[String]) -> Option<Value> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let value = match self {
            FieldKind::Text => Value::Text(raw.to_string()),
            FieldKind::Number { .. } => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::Unparsable(raw.to_string()),
            },
            FieldKind::Date => match parse_date(trimmed, date_formats) {
                Some(d) => Value::Date(d),
                None => Value::Unparsable(raw.to_string()),
            },
            FieldKind::Enum { .. } => match self.match_choice(trimmed) {
                Some(canonical) => Value::Choice(canonical.to_string()),
                None => Value::Choice(trimmed.to_string()),
            },
        };
        Some(value)
    }
}

/// Tries each format in order; the first one producing a real calendar date wins.
pub fn parse_date(raw: &str, date_formats: &[String]) -> Option<NaiveDate> {
    date_formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}
