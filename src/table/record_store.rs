// src/table/record_store.rs
//! In-memory row collection with per-row lifecycle state, edit buffers and
//! last-committed baselines. Pure state holder: no I/O happens here.

use std::collections::HashMap;
use std::mem;
use tracing::trace;

use super::definitions::{FieldMap, Row, RowId, RowState, Value};
use super::error::TableError;

/// What happened when a row left edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseEdit {
    /// The row was not in edit mode.
    NotEditing,
    /// Buffer applied to the base row.
    Applied { changed: bool },
    /// Buffer dropped, base row untouched.
    Discarded,
    /// Edit of a never-committed row was cancelled; the row is gone.
    RemovedAdded,
}

#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    rows: Vec<Row>,
    // Open edit buffers, keyed by row
    edits: HashMap<RowId, FieldMap>,
    // Last committed values of rows in PersistedEdited
    baselines: HashMap<RowId, FieldMap>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole contents with rows from the remote store.
    pub fn load(&mut self, rows: Vec<Row>) {
        self.rows = rows
            .into_iter()
            .map(|mut row| {
                row.state = RowState::Persisted;
                row
            })
            .collect();
        self.edits.clear();
        self.baselines.clear();
        trace!("RecordStore: loaded {} row(s).", self.rows.len());
    }

    /// Takes the server's rows after a save while keeping work done since `sent`
    /// was captured. Open buffers survive on rows the server returned, and rows
    /// whose settled values moved on stay `PersistedEdited` against the saved
    /// values. Returns the ids still carrying unsaved changes.
    pub fn reconcile_saved(&mut self, saved: Vec<Row>, sent: &[Row]) -> Vec<RowId> {
        let moved_on: HashMap<RowId, FieldMap> = self
            .rows
            .iter()
            .filter(|row| {
                sent.iter()
                    .find(|s| s.id == row.id)
                    .map_or(true, |s| s.fields != row.fields)
            })
            .map(|row| (row.id.clone(), row.fields.clone()))
            .collect();
        let open = mem::take(&mut self.edits);

        self.load(saved);

        let mut pending = Vec::new();
        for row in self.rows.iter_mut() {
            if let Some(fields) = moved_on.get(&row.id) {
                if *fields != row.fields {
                    self.baselines
                        .insert(row.id.clone(), mem::replace(&mut row.fields, fields.clone()));
                    row.state = RowState::PersistedEdited;
                    pending.push(row.id.clone());
                }
            }
            if let Some(buffer) = open.get(&row.id) {
                self.edits.insert(row.id.clone(), buffer.clone());
                if !pending.contains(&row.id) {
                    pending.push(row.id.clone());
                }
            }
        }
        pending
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }

    /// Base (last settled) values of a row.
    pub fn get(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn state(&self, id: &RowId) -> Option<RowState> {
        self.get(id).map(|r| r.state)
    }

    /// Base rows in display order, ignoring open edit buffers.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    /// A row with its edit buffer merged in; buffer wins per field.
    pub fn merged(&self, id: &RowId) -> Option<Row> {
        self.get(id).map(|row| self.merge(row))
    }

    /// Every row with open edit buffers merged in.
    pub fn merged_rows(&self) -> Vec<Row> {
        self.rows.iter().map(|row| self.merge(row)).collect()
    }

    fn merge(&self, row: &Row) -> Row {
        let mut merged = row.clone();
        if let Some(buffer) = self.edits.get(&row.id) {
            for (field, value) in buffer {
                merged.fields.insert(field.clone(), value.clone());
            }
        }
        merged
    }

    /// Appends a never-committed row. The caller opens its edit buffer.
    pub fn push_added(&mut self, id: RowId, fields: FieldMap) {
        self.rows.push(Row {
            id,
            fields,
            state: RowState::Added,
        });
    }

    pub fn is_editing(&self, id: &RowId) -> bool {
        self.edits.contains_key(id)
    }

    /// Rows in edit mode, in display order.
    pub fn editing_ids(&self) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|r| self.edits.contains_key(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn added_ids(&self) -> Vec<RowId> {
        self.ids_where(|state| state == RowState::Added)
    }

    /// Rows touched in edit mode since the last commit, added rows included.
    pub fn modified_ids(&self) -> Vec<RowId> {
        self.ids_where(RowState::is_pending)
    }

    fn ids_where(&self, pred: impl Fn(RowState) -> bool) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|r| pred(r.state))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Opens an edit buffer. Returns false when the row was already editing.
    pub fn open_edit(&mut self, id: &RowId) -> Result<bool, TableError> {
        if !self.contains(id) {
            return Err(TableError::StaleReference(id.clone()));
        }
        if self.edits.contains_key(id) {
            return Ok(false);
        }
        self.edits.insert(id.clone(), FieldMap::new());
        Ok(true)
    }

    /// Writes one cell into the row's edit buffer, opening it if needed.
    pub fn set_buffer_value(
        &mut self,
        id: &RowId,
        field: &str,
        value: Option<Value>,
    ) -> Result<(), TableError> {
        if !self.contains(id) {
            return Err(TableError::StaleReference(id.clone()));
        }
        self.edits
            .entry(id.clone())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    /// Ends edit mode for a row, applying or discarding its buffer.
    pub fn close_edit(&mut self, id: &RowId, discard: bool) -> Result<CloseEdit, TableError> {
        let Some(pos) = self.position(id) else {
            self.edits.remove(id);
            return Err(TableError::StaleReference(id.clone()));
        };
        let Some(buffer) = self.edits.remove(id) else {
            return Ok(CloseEdit::NotEditing);
        };

        if discard {
            if self.rows[pos].state == RowState::Added {
                self.rows.remove(pos);
                return Ok(CloseEdit::RemovedAdded);
            }
            return Ok(CloseEdit::Discarded);
        }

        let row = &mut self.rows[pos];
        let changed_fields: Vec<(String, Option<Value>)> = buffer
            .into_iter()
            .filter(|(field, value)| row.fields.get(field) != Some(value))
            .collect();
        let changed = !changed_fields.is_empty();

        if changed && row.state == RowState::Persisted {
            self.baselines.insert(row.id.clone(), row.fields.clone());
            row.state = RowState::PersistedEdited;
        }
        for (field, value) in changed_fields {
            row.fields.insert(field, value);
        }

        // Edited back to the committed values: nothing left to save
        if row.state == RowState::PersistedEdited
            && self.baselines.get(&row.id) == Some(&row.fields)
        {
            self.baselines.remove(&row.id);
            row.state = RowState::Persisted;
        }
        Ok(CloseEdit::Applied { changed })
    }

    /// Removes rows by id, returning the ids that were actually present.
    pub fn remove(&mut self, ids: &[RowId]) -> Vec<RowId> {
        let mut removed = Vec::new();
        self.rows.retain(|row| {
            if ids.contains(&row.id) {
                removed.push(row.id.clone());
                false
            } else {
                true
            }
        });
        for id in &removed {
            self.edits.remove(id);
            self.baselines.remove(id);
        }
        removed
    }

    /// Drops every uncommitted change: added rows vanish, edited rows return to
    /// their baseline, open buffers are discarded. Returns the number of rows touched.
    pub fn revert_all(&mut self) -> usize {
        let before = self.rows.len();
        let editing = self.edits.len();
        self.rows.retain(|row| row.state != RowState::Added);
        let mut touched = before - self.rows.len();

        for row in self.rows.iter_mut() {
            if let Some(baseline) = self.baselines.remove(&row.id) {
                row.fields = baseline;
                row.state = RowState::Persisted;
                touched += 1;
            } else if self.edits.contains_key(&row.id) {
                touched += 1;
            }
        }
        self.edits.clear();
        self.baselines.clear();
        trace!(
            "RecordStore: reverted {} row(s) ({} had open edit buffers).",
            touched,
            editing
        );
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Value> {
        Some(Value::Text(s.to_string()))
    }

    fn store_with(ids: &[&str]) -> RecordStore {
        let mut store = RecordStore::new();
        store.load(
            ids.iter()
                .map(|id| Row::persisted(*id, FieldMap::new()).with("name", text(id)))
                .collect(),
        );
        store
    }

    #[test]
    fn test_merged_view_prefers_buffer() {
        let mut store = store_with(&["a", "b"]);
        let a = RowId::from("a");
        store.set_buffer_value(&a, "name", text("edited")).unwrap();

        assert_eq!(store.get(&a).unwrap().get("name"), text("a").as_ref());
        assert_eq!(store.merged(&a).unwrap().get("name"), text("edited").as_ref());
        assert!(store.is_editing(&a));
        assert_eq!(store.editing_ids(), vec![a]);
    }

    #[test]
    fn test_close_edit_marks_persisted_row_edited() {
        let mut store = store_with(&["a"]);
        let a = RowId::from("a");
        store.open_edit(&a).unwrap();
        store.set_buffer_value(&a, "name", text("renamed")).unwrap();

        assert_eq!(
            store.close_edit(&a, false).unwrap(),
            CloseEdit::Applied { changed: true }
        );
        assert_eq!(store.state(&a), Some(RowState::PersistedEdited));
        assert_eq!(store.modified_ids(), vec![a.clone()]);
        assert!(store.added_ids().is_empty());
        assert!(!store.is_editing(&a));
    }

    #[test]
    fn test_editing_back_to_baseline_clears_pending_state() {
        let mut store = store_with(&["a"]);
        let a = RowId::from("a");
        store.set_buffer_value(&a, "name", text("x")).unwrap();
        store.close_edit(&a, false).unwrap();
        store.set_buffer_value(&a, "name", text("a")).unwrap();
        store.close_edit(&a, false).unwrap();
        assert_eq!(store.state(&a), Some(RowState::Persisted));
        assert!(store.modified_ids().is_empty());
    }

    #[test]
    fn test_unchanged_buffer_keeps_row_persisted() {
        let mut store = store_with(&["a"]);
        let a = RowId::from("a");
        store.set_buffer_value(&a, "name", text("a")).unwrap();
        assert_eq!(
            store.close_edit(&a, false).unwrap(),
            CloseEdit::Applied { changed: false }
        );
        assert_eq!(store.state(&a), Some(RowState::Persisted));
    }

    #[test]
    fn test_discarding_added_row_removes_it() {
        let mut store = store_with(&["a"]);
        let new_id = RowId::from("tmp-1");
        store.push_added(new_id.clone(), FieldMap::new());
        store.open_edit(&new_id).unwrap();
        assert_eq!(store.added_ids(), vec![new_id.clone()]);

        assert_eq!(
            store.close_edit(&new_id, true).unwrap(),
            CloseEdit::RemovedAdded
        );
        assert!(!store.contains(&new_id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_revert_all_restores_baselines_and_drops_added_rows() {
        let mut store = store_with(&["a", "b"]);
        let a = RowId::from("a");
        let b = RowId::from("b");
        store.set_buffer_value(&a, "name", text("changed")).unwrap();
        store.close_edit(&a, false).unwrap();
        store.set_buffer_value(&b, "name", text("pending")).unwrap();
        store.push_added(RowId::from("tmp-1"), FieldMap::new());

        assert_eq!(store.revert_all(), 3);
        assert_eq!(store.row_ids(), vec![a.clone(), b.clone()]);
        assert_eq!(store.get(&a).unwrap().get("name"), text("a").as_ref());
        assert_eq!(store.merged(&b).unwrap().get("name"), text("b").as_ref());
        assert!(store.modified_ids().is_empty());
        assert!(store.editing_ids().is_empty());
    }

    #[test]
    fn test_stale_references_are_reported() {
        let mut store = store_with(&["a"]);
        let ghost = RowId::from("ghost");
        assert!(matches!(
            store.open_edit(&ghost),
            Err(TableError::StaleReference(_))
        ));
        assert!(matches!(
            store.close_edit(&ghost, false),
            Err(TableError::StaleReference(_))
        ));
        assert_eq!(store.remove(&[ghost]), Vec::<RowId>::new());
    }

    #[test]
    fn test_load_resets_lifecycle() {
        let mut store = store_with(&["a"]);
        store.push_added(RowId::from("tmp-1"), FieldMap::new());
        store.open_edit(&RowId::from("tmp-1")).unwrap();
        let mut rows = store.merged_rows();
        rows[1].id = RowId::from("srv-9");
        store.load(rows);
        assert!(store.added_ids().is_empty());
        assert!(store.editing_ids().is_empty());
        assert_eq!(store.state(&RowId::from("srv-9")), Some(RowState::Persisted));
    }

    #[test]
    fn test_reconcile_keeps_changes_made_after_the_save_started() {
        let mut store = store_with(&["a", "b", "c"]);
        let sent = store.merged_rows();
        let (a, b) = (RowId::from("a"), RowId::from("b"));

        // While the upsert is pending: "a" settles a new value, "b" is mid-edit
        store.set_buffer_value(&a, "name", text("late")).unwrap();
        store.close_edit(&a, false).unwrap();
        store.set_buffer_value(&b, "name", text("typing")).unwrap();

        let pending = store.reconcile_saved(sent.clone(), &sent);

        assert_eq!(pending, vec![a.clone(), b.clone()]);
        assert_eq!(store.state(&a), Some(RowState::PersistedEdited));
        assert_eq!(store.get(&a).unwrap().get("name"), text("late").as_ref());
        assert!(store.is_editing(&b));
        assert_eq!(store.merged(&b).unwrap().get("name"), text("typing").as_ref());
        assert_eq!(store.state(&RowId::from("c")), Some(RowState::Persisted));

        // The saved values are the new baseline for "a"
        store.revert_all();
        assert_eq!(store.get(&a).unwrap().get("name"), text("a").as_ref());
    }

    #[test]
    fn test_reconcile_without_late_changes_matches_load() {
        let mut store = RecordStore::new();
        assert!(store.is_empty());
        store.push_added(RowId::from("tmp-1"), FieldMap::new());
        let sent = store.merged_rows();
        let mut saved = sent.clone();
        saved[0].id = RowId::from("srv-1");

        assert!(store.reconcile_saved(saved, &sent).is_empty());
        assert_eq!(store.row_ids(), vec![RowId::from("srv-1")]);
        assert!(store.modified_ids().is_empty());
        assert!(!store.is_empty());
    }
}
