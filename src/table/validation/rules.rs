// src/table/validation/rules.rs
//! Single-cell rules. Each returns the message for the first problem found, if any.

use std::collections::HashMap;

use crate::table::definitions::{Row, Value};
use crate::table::field_kind::FieldKind;
use crate::table::schema::{FieldDefinition, TableSchema};

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Number { .. } => "number",
        FieldKind::Date => "date",
        FieldKind::Enum { .. } => "choice",
    }
}

/// Variant must match the field kind. Runs before any domain rule.
pub(crate) fn structural_error(def: &FieldDefinition, value: &Value) -> Option<String> {
    if let Value::Unparsable(raw) = value {
        return Some(format!(
            "{}: '{}' could not be parsed as a {}",
            def.display_label(),
            raw,
            kind_name(&def.kind)
        ));
    }
    if !def.kind.accepts(value) {
        return Some(format!(
            "{} expects a {} value, got {}",
            def.display_label(),
            kind_name(&def.kind),
            value.variant_name()
        ));
    }
    match value {
        // NaN slips past range checks and cannot be stored as JSON
        Value::Number(n) if !n.is_finite() => {
            Some(format!("{} must be a finite number", def.display_label()))
        }
        _ => None,
    }
}

/// Range and membership checks for a structurally valid, non-empty value.
pub(crate) fn format_error(def: &FieldDefinition, value: &Value) -> Option<String> {
    match (&def.kind, value) {
        (FieldKind::Number { min, max }, Value::Number(n)) => {
            if let Some(min) = min {
                if n < min {
                    return Some(format!("{} must be at least {}", def.display_label(), min));
                }
            }
            if let Some(max) = max {
                if n > max {
                    return Some(format!("{} must be at most {}", def.display_label(), max));
                }
            }
            None
        }
        (FieldKind::Enum { choices }, Value::Choice(choice)) => {
            if def.kind.match_choice(choice).is_some() {
                None
            } else {
                Some(format!(
                    "{} must be one of: {}",
                    def.display_label(),
                    choices.join(", ")
                ))
            }
        }
        _ => None,
    }
}

/// Errors produced by the schema's dependency chains for one row, keyed by field.
///
/// A chain is active once any member is filled. The first empty member is required,
/// and every member after it is flagged as depending on it, filled or not.
pub(crate) fn chain_errors(row: &Row, schema: &TableSchema) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    for chain in &schema.chains {
        let active = chain.fields.iter().any(|f| !row.is_empty_field(f));
        if !active {
            continue;
        }
        let Some(first_missing) = chain.fields.iter().position(|f| row.is_empty_field(f)) else {
            continue;
        };
        let parent = &chain.fields[first_missing];
        errors
            .entry(parent.clone())
            .or_insert_with(|| format!("{} is required", schema.label(parent)));
        for dependent in &chain.fields[first_missing + 1..] {
            errors.entry(dependent.clone()).or_insert_with(|| {
                format!(
                    "{} requires {}",
                    schema.label(dependent),
                    schema.label(parent)
                )
            });
        }
    }
    errors
}
