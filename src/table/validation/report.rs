// src/table/validation/report.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::table::definitions::RowId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

/// Errors per row. A row appears only while it has at least one error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: BTreeMap<RowId, Vec<FieldError>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a row's errors; rows without errors are left out.
    pub fn insert_row(&mut self, id: RowId, errors: Vec<FieldError>) {
        if errors.is_empty() {
            self.errors.remove(&id);
        } else {
            self.errors.insert(id, errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.errors.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn contains_row(&self, id: &RowId) -> bool {
        self.errors.contains_key(id)
    }

    pub fn errors_for(&self, id: &RowId) -> Option<&[FieldError]> {
        self.errors.get(id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &Vec<FieldError>)> {
        self.errors.iter()
    }

    pub fn remove_rows(&mut self, ids: &[RowId]) {
        for id in ids {
            self.errors.remove(id);
        }
    }
}
