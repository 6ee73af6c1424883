// src/table/validation/mod.rs
//! Pure row validation.
//!
//! Per row, fields are checked in schema order and each field reports at most one
//! error. Rules run in this order, first failure wins:
//!
//! 1. structural (value variant vs field kind, unparsable input)
//! 2. always-required fields
//! 3. dependency chains
//! 4. format (number ranges, enum membership)

mod report;
mod rules;

pub use report::{FieldError, ValidationReport};

use super::definitions::Row;
use super::schema::TableSchema;

/// Validates every row. Identical input always yields an identical report.
pub fn validate(rows: &[Row], schema: &TableSchema) -> ValidationReport {
    let mut report = ValidationReport::new();
    for row in rows {
        report.insert_row(row.id.clone(), validate_row(row, schema));
    }
    report
}

/// Errors for a single row, in schema field order.
pub fn validate_row(row: &Row, schema: &TableSchema) -> Vec<FieldError> {
    let chain = rules::chain_errors(row, schema);
    let mut errors = Vec::new();

    for def in &schema.fields {
        let name = def.name.as_str();
        let value = row.get(name).filter(|v| !v.is_blank());

        if let Some(message) = value.and_then(|v| rules::structural_error(def, v)) {
            errors.push(FieldError::new(name, message));
            continue;
        }
        if value.is_none() && schema.is_required(name) {
            errors.push(FieldError::new(
                name,
                format!("{} is required", def.display_label()),
            ));
            continue;
        }
        if let Some(message) = chain.get(name) {
            errors.push(FieldError::new(name, message.clone()));
            continue;
        }
        if let Some(message) = value.and_then(|v| rules::format_error(def, v)) {
            errors.push(FieldError::new(name, message));
        }
    }
    errors
}
