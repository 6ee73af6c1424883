// src/table/definitions.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type FieldName = String;

/// Field values of one row. Every schema field is present; `None` is an empty cell.
pub type FieldMap = BTreeMap<FieldName, Option<Value>>;

/// Stable row identifier. Server ids for persisted rows, `tmp-...` ids for rows added locally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a client-side id for a row that has never been committed.
    pub fn generate() -> Self {
        // Timestamp + random component, same shape as structure row ids
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("tmp-{}-{}", millis, &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Choice(String),
    /// Raw input that could not be coerced into the field's kind.
    Unparsable(String),
}

impl Value {
    /// Blank text and blank choices count as empty, like a missing value.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) | Value::Choice(s) => s.trim().is_empty(),
            Value::Number(_) | Value::Date(_) | Value::Unparsable(_) => false,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::Choice(_) => "choice",
            Value::Unparsable(_) => "unparsable",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Choice(s) | Value::Unparsable(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Returns true when the cell holds no usable value.
pub fn is_empty_cell(value: Option<&Option<Value>>) -> bool {
    match value {
        None | Some(None) => true,
        Some(Some(v)) => v.is_blank(),
    }
}

/// Lifecycle of a row relative to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RowState {
    /// Matches the last committed values.
    #[default]
    Persisted,
    /// Persisted row whose values were changed in edit mode since the last commit.
    PersistedEdited,
    /// Created locally, never committed.
    Added,
}

impl RowState {
    pub fn is_pending(self) -> bool {
        !matches!(self, RowState::Persisted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub fields: FieldMap,
    #[serde(default)]
    pub state: RowState,
}

impl Row {
    /// A row as loaded from the remote store.
    pub fn persisted(id: impl Into<RowId>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
            state: RowState::Persisted,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).and_then(|v| v.as_ref())
    }

    pub fn is_empty_field(&self, field: &str) -> bool {
        is_empty_cell(self.fields.get(field))
    }

    /// Builder-style setter, handy for fixtures and hosts building rows by hand.
    pub fn with(mut self, field: &str, value: Option<Value>) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }
}
