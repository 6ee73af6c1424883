// src/table/navigation.rs
// Stepping through outstanding validation errors in display order

use std::collections::HashMap;

use super::definitions::RowId;
use super::validation::ValidationReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    pub row_id: RowId,
    pub field: String,
    pub message: String,
}

/// Ordered cursor over individual field errors.
///
/// Entries sort by the row's display position, then the column's display position.
/// Rows or columns missing from the display order go last, by id / name.
#[derive(Debug, Default, Clone)]
pub struct ValidationNavigator {
    entries: Vec<NavigationEntry>,
    index: usize,
}

impl ValidationNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the entry list from a fresh report, keeping the cursor where it was
    /// and clamping it to the last entry if the list shrank.
    pub fn rebuild(
        &mut self,
        report: &ValidationReport,
        row_order: &[RowId],
        column_order: &[String],
    ) {
        let row_pos: HashMap<&RowId, usize> =
            row_order.iter().enumerate().map(|(i, id)| (id, i)).collect();
        let col_pos: HashMap<&str, usize> = column_order
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let mut entries: Vec<NavigationEntry> = report
            .iter()
            .flat_map(|(row_id, errors)| {
                errors.iter().map(move |e| NavigationEntry {
                    row_id: row_id.clone(),
                    field: e.field.clone(),
                    message: e.message.clone(),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            let row_key = |e: &NavigationEntry| {
                (
                    row_pos.get(&e.row_id).copied().unwrap_or(usize::MAX),
                    e.row_id.clone(),
                )
            };
            let col_key = |e: &NavigationEntry| {
                (
                    col_pos.get(e.field.as_str()).copied().unwrap_or(usize::MAX),
                    e.field.clone(),
                )
            };
            row_key(a)
                .cmp(&row_key(b))
                .then_with(|| col_key(a).cmp(&col_key(b)))
        });

        self.entries = entries;
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.entries.is_empty() {
            self.index = 0;
        } else if self.index >= self.entries.len() {
            self.index = self.entries.len() - 1;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Zero-based cursor, `None` when there is nothing to navigate.
    pub fn current_index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.index)
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.entries.get(self.index)
    }

    /// Advances with wraparound.
    pub fn next(&mut self) -> Option<&NavigationEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.entries.get(self.index)
    }

    /// Steps back with wraparound.
    pub fn previous(&mut self) -> Option<&NavigationEntry> {
        if self.entries.is_empty() {
            return None;
        }
        self.index = if self.index == 0 {
            self.entries.len() - 1
        } else {
            self.index - 1
        };
        self.entries.get(self.index)
    }

    /// `"i/n"`, 1-based, or `"0/0"` with no errors.
    pub fn current_indicator(&self) -> String {
        if self.entries.is_empty() {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.index + 1, self.entries.len())
        }
    }
}
