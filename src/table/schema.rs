// src/table/schema.rs
//! Table schemas: typed field definitions, the always-required list and dependency chains.
//!
//! The two built-in presets cover the observation table and the telemetry fix table.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::definitions::FieldMap;
use super::error::TableError;
use super::field_kind::FieldKind;

fn default_editable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default = "default_editable")]
    pub editable: bool,
}

impl FieldDefinition {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            kind,
            editable: true,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered parent -> child fields. Once any member is filled, a missing member
/// invalidates every field after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyChain {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub chains: Vec<DependencyChain>,
    /// Field focused when a freshly added row enters edit mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_edit_field: Option<String>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.field(name).map(|f| f.display_label()).unwrap_or(name)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// The configured first edit field, else the first editable field.
    pub fn first_edit_field(&self) -> Option<&str> {
        self.first_edit_field
            .as_deref()
            .or_else(|| self.fields.iter().find(|f| f.editable).map(|f| f.name.as_str()))
    }

    /// Every schema field present and empty.
    pub fn blank_fields(&self) -> FieldMap {
        self.fields.iter().map(|f| (f.name.clone(), None)).collect()
    }

    /// Checks that every name referenced by the schema is a declared field.
    pub fn check(&self) -> Result<(), TableError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(TableError::InvalidSchema(format!(
                    "field '{}' is declared twice in '{}'",
                    field.name, self.name
                )));
            }
        }
        let unknown = |name: &str| !seen.contains(name);
        if let Some(missing) = self.required.iter().find(|r| unknown(r)) {
            return Err(TableError::InvalidSchema(format!(
                "required field '{}' is not declared in '{}'",
                missing, self.name
            )));
        }
        for chain in &self.chains {
            if chain.fields.len() < 2 {
                return Err(TableError::InvalidSchema(format!(
                    "dependency chain '{}' needs at least two fields",
                    chain.name
                )));
            }
            if let Some(missing) = chain.fields.iter().find(|f| unknown(f)) {
                return Err(TableError::InvalidSchema(format!(
                    "dependency chain '{}' references unknown field '{}'",
                    chain.name, missing
                )));
            }
        }
        if let Some(first) = &self.first_edit_field {
            if unknown(first) {
                return Err(TableError::InvalidSchema(format!(
                    "first edit field '{}' is not declared in '{}'",
                    first, self.name
                )));
            }
        }
        Ok(())
    }

    /// Survey observation records.
    pub fn observations() -> Self {
        let choice = |values: &[&str]| FieldKind::Enum {
            choices: values.iter().map(|v| v.to_string()).collect(),
        };
        Self {
            name: "observations".to_string(),
            fields: vec![
                FieldDefinition::new("species", FieldKind::Text).labeled("Species"),
                FieldDefinition::new(
                    "count",
                    FieldKind::Number {
                        min: Some(0.0),
                        max: None,
                    },
                )
                .labeled("Count"),
                FieldDefinition::new("observed_on", FieldKind::Date).labeled("Observation date"),
                FieldDefinition::new("observer", FieldKind::Text).labeled("Observer"),
                FieldDefinition::new("site", FieldKind::Text).labeled("Site"),
                FieldDefinition::new(
                    "survey_method",
                    choice(&["point_count", "transect", "mist_net", "camera_trap"]),
                )
                .labeled("Survey method"),
                FieldDefinition::new(
                    "survey_period",
                    choice(&["dawn", "morning", "afternoon", "dusk", "night"]),
                )
                .labeled("Survey period"),
                FieldDefinition::new("notes", FieldKind::Text).labeled("Notes"),
            ],
            required: vec![
                "species".to_string(),
                "count".to_string(),
                "observed_on".to_string(),
            ],
            chains: vec![DependencyChain {
                name: "survey".to_string(),
                fields: vec![
                    "site".to_string(),
                    "survey_method".to_string(),
                    "survey_period".to_string(),
                ],
            }],
            first_edit_field: Some("species".to_string()),
        }
    }

    /// Animal telemetry fixes.
    pub fn telemetry_fixes() -> Self {
        Self {
            name: "telemetry_fixes".to_string(),
            fields: vec![
                FieldDefinition::new("device_id", FieldKind::Text).labeled("Device"),
                FieldDefinition::new("fix_date", FieldKind::Date).labeled("Fix date"),
                FieldDefinition::new(
                    "latitude",
                    FieldKind::Number {
                        min: Some(-90.0),
                        max: Some(90.0),
                    },
                )
                .labeled("Latitude"),
                FieldDefinition::new(
                    "longitude",
                    FieldKind::Number {
                        min: Some(-180.0),
                        max: Some(180.0),
                    },
                )
                .labeled("Longitude"),
                FieldDefinition::new(
                    "fix_type",
                    FieldKind::Enum {
                        choices: vec!["2d".to_string(), "3d".to_string()],
                    },
                )
                .labeled("Fix type"),
                FieldDefinition::new("animal_id", FieldKind::Text).labeled("Animal"),
                FieldDefinition::new("deployment_id", FieldKind::Text).labeled("Deployment"),
            ],
            required: vec![
                "device_id".to_string(),
                "fix_date".to_string(),
                "latitude".to_string(),
                "longitude".to_string(),
            ],
            chains: vec![DependencyChain {
                name: "deployment".to_string(),
                fields: vec!["animal_id".to_string(), "deployment_id".to_string()],
            }],
            first_edit_field: Some("device_id".to_string()),
        }
    }
}
