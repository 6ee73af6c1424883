// src/table/selection.rs

use std::collections::BTreeSet;

use super::definitions::RowId;

/// Selected row ids. Independent of edit state; pruned when rows go away.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionTracker {
    selected: BTreeSet<RowId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: RowId) -> bool {
        self.selected.insert(id)
    }

    pub fn deselect(&mut self, id: &RowId) -> bool {
        self.selected.remove(id)
    }

    /// Flips membership; returns whether the row is selected afterwards.
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn replace(&mut self, ids: impl IntoIterator<Item = RowId>) {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.selected.iter().cloned().collect()
    }

    /// Drops the given ids from the selection.
    pub fn prune(&mut self, ids: &[RowId]) {
        for id in ids {
            self.selected.remove(id);
        }
    }

    /// Keeps only ids for which `exists` holds.
    pub fn retain_existing(&mut self, exists: impl Fn(&RowId) -> bool) {
        self.selected.retain(|id| exists(id));
    }
}
