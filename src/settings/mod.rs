pub mod io;

use serde::{Deserialize, Serialize};

/// Engine-wide knobs. Every field has a default, so partial JSON files load.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// How long a commit waits for editing rows to settle. `None` waits forever.
    pub settle_timeout_ms: Option<u64>,
    /// chrono formats tried, in order, when coercing raw date text.
    pub date_formats: Vec<String>,
    pub confirm_single: String,
    /// `{count}` is replaced with the number of rows.
    pub confirm_plural: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            settle_timeout_ms: Some(10_000),
            date_formats: vec!["%Y-%m-%d".to_string(), "%d/%m/%Y".to_string()],
            confirm_single: "Delete this record?".to_string(),
            confirm_plural: "Delete these {count} records?".to_string(),
        }
    }
}

impl EngineSettings {
    /// Confirmation wording for deleting `count` rows.
    pub fn confirmation_message(&self, count: usize) -> String {
        if count == 1 {
            self.confirm_single.clone()
        } else {
            self.confirm_plural.replace("{count}", &count.to_string())
        }
    }
}
