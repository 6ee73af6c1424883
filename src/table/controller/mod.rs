// src/table/controller/mod.rs
//! One controller per table instance.
//!
//! `TableController` is a cheap-clone handle over shared state. It is `!Send`: all of
//! its futures run on one thread. The state borrow is never held while a
//! collaborator is called or across an `.await`, so collaborators may call back
//! into the controller synchronously (through a [`WeakTableController`]).
//!
//! The mutating operations live in `table::logic`, one file per operation.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use super::collaborators::Collaborators;
use super::definitions::{Row, RowId, RowState};
use super::error::{TableError, TableResult};
use super::events::TableOperationFeedback;
use super::navigation::{NavigationEntry, ValidationNavigator};
use super::record_store::RecordStore;
use super::schema::TableSchema;
use super::selection::SelectionTracker;
use super::validation::{self, ValidationReport};
use crate::settings::EngineSettings;

/// Where a commit currently is. Published on a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPhase {
    #[default]
    Idle,
    ValidationFailed,
    StoppingEdits,
    AwaitingSettle,
    Saving,
    SaveSucceeded,
    SaveFailed,
    RevertingEdits,
}

impl CommitPhase {
    pub fn is_idle(self) -> bool {
        self == CommitPhase::Idle
    }
}

#[derive(Debug, Default)]
pub(crate) struct TableState {
    pub(crate) store: RecordStore,
    pub(crate) report: ValidationReport,
    pub(crate) selection: SelectionTracker,
    pub(crate) navigator: ValidationNavigator,
    pub(crate) column_order: Vec<String>,
    // None: store order
    pub(crate) row_order: Option<Vec<RowId>>,
    pub(crate) remote_count: Option<u64>,
    pub(crate) deletion_in_flight: bool,
}

impl TableState {
    fn display_row_order(&self) -> Vec<RowId> {
        match &self.row_order {
            Some(order) => order.clone(),
            None => self.store.row_ids(),
        }
    }

    pub(crate) fn rebuild_navigator(&mut self) {
        let order = self.display_row_order();
        self.navigator
            .rebuild(&self.report, &order, &self.column_order);
    }

    /// Drops selected ids whose rows are gone.
    pub(crate) fn prune_selection(&mut self) {
        let store = &self.store;
        self.selection.retain_existing(|id| store.contains(id));
    }

    /// Bookkeeping after the store took a fresh set of rows from the server.
    pub(crate) fn finish_reload(&mut self, total_count: Option<u64>) {
        let loaded = self.store.len() as u64;
        self.remote_count = Some(total_count.unwrap_or(loaded));
        self.report = ValidationReport::new();
        self.prune_selection();
        self.rebuild_navigator();
    }

    /// Forgets report entries for removed rows.
    pub(crate) fn forget_rows(&mut self, ids: &[RowId]) {
        self.report.remove_rows(ids);
        self.selection.prune(ids);
        self.rebuild_navigator();
    }
}

pub(crate) struct ControllerInner {
    pub(crate) schema: TableSchema,
    pub(crate) settings: EngineSettings,
    pub(crate) collaborators: Collaborators,
    pub(crate) state: RefCell<TableState>,
    /// Woken by every edit-surface event and by teardown.
    pub(crate) settle_signal: Notify,
    pub(crate) phase: watch::Sender<CommitPhase>,
    pub(crate) alive: Cell<bool>,
}

#[derive(Clone)]
pub struct TableController {
    pub(crate) inner: Rc<ControllerInner>,
}

/// Non-owning handle for collaborators that call back into the controller.
#[derive(Clone)]
pub struct WeakTableController {
    inner: Weak<ControllerInner>,
}

impl WeakTableController {
    pub fn upgrade(&self) -> Option<TableController> {
        self.inner.upgrade().map(|inner| TableController { inner })
    }
}

impl TableController {
    pub fn new(
        schema: TableSchema,
        settings: EngineSettings,
        collaborators: Collaborators,
    ) -> TableResult<Self> {
        schema.check()?;
        let (phase, _) = watch::channel(CommitPhase::Idle);
        let state = TableState {
            column_order: schema.field_names(),
            ..TableState::default()
        };
        debug!("TableController: created for '{}'.", schema.name);
        Ok(Self {
            inner: Rc::new(ControllerInner {
                schema,
                settings,
                collaborators,
                state: RefCell::new(state),
                settle_signal: Notify::new(),
                phase,
                alive: Cell::new(true),
            }),
        })
    }

    pub fn downgrade(&self) -> WeakTableController {
        WeakTableController {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.inner.schema
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    pub(crate) fn table_name(&self) -> &str {
        &self.inner.schema.name
    }

    pub(crate) fn state(&self) -> Ref<'_, TableState> {
        self.inner.state.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, TableState> {
        self.inner.state.borrow_mut()
    }

    // ---- lifecycle ----

    pub fn phase(&self) -> CommitPhase {
        *self.inner.phase.borrow()
    }

    /// Receiver that observes every commit phase transition.
    pub fn subscribe_phase(&self) -> watch::Receiver<CommitPhase> {
        self.inner.phase.subscribe()
    }

    pub(crate) fn set_phase(&self, phase: CommitPhase) {
        let previous = self.inner.phase.send_replace(phase);
        debug!(
            "Table '{}': commit phase {:?} -> {:?}",
            self.table_name(),
            previous,
            phase
        );
    }

    pub fn is_alive(&self) -> bool {
        self.inner.alive.get()
    }

    pub(crate) fn ensure_alive(&self) -> TableResult<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(TableError::TornDown)
        }
    }

    /// Marks the controller dead. Requests already in flight still complete, but
    /// their results are discarded and the waiting operation returns `TornDown`.
    pub fn teardown(&self) {
        if !self.inner.alive.replace(false) {
            return;
        }
        info!("Table '{}': controller torn down.", self.table_name());
        self.inner.settle_signal.notify_one();
    }

    pub(crate) fn feedback(&self, message: String, is_error: bool) {
        let feedback = if is_error {
            TableOperationFeedback::error(message)
        } else {
            TableOperationFeedback::info(message)
        };
        self.inner.collaborators.notifier.notify(&feedback);
    }

    // ---- reads ----

    /// Every row with open edit buffers merged in, in store order.
    pub fn rows(&self) -> Vec<Row> {
        self.state().store.merged_rows()
    }

    pub fn row(&self, id: &RowId) -> Option<Row> {
        self.state().store.merged(id)
    }

    pub fn row_count(&self) -> usize {
        self.state().store.len()
    }

    pub fn row_state(&self, id: &RowId) -> Option<RowState> {
        self.state().store.state(id)
    }

    pub fn added_ids(&self) -> Vec<RowId> {
        self.state().store.added_ids()
    }

    pub fn modified_ids(&self) -> Vec<RowId> {
        self.state().store.modified_ids()
    }

    pub fn editing_ids(&self) -> Vec<RowId> {
        self.state().store.editing_ids()
    }

    pub fn is_editing(&self, id: &RowId) -> bool {
        self.state().store.is_editing(id)
    }

    /// Row count last reported by the remote store.
    pub fn remote_count(&self) -> Option<u64> {
        self.state().remote_count
    }

    pub fn is_deleting(&self) -> bool {
        self.state().deletion_in_flight
    }

    // ---- loading ----

    /// Replaces the table contents with rows read from the remote store.
    /// Rejected with `Busy` while a commit is running.
    pub fn load(&self, rows: Vec<Row>, total_count: Option<u64>) -> TableResult<()> {
        self.ensure_alive()?;
        if !self.phase().is_idle() {
            warn!("Table '{}': load rejected, commit in flight.", self.table_name());
            return Err(TableError::Busy("commit"));
        }
        self.replace_rows(rows, total_count);
        Ok(())
    }

    pub(crate) fn replace_rows(&self, rows: Vec<Row>, total_count: Option<u64>) {
        let mut state = self.state_mut();
        state.store.load(rows);
        state.finish_reload(total_count);
        debug!(
            "Table '{}': loaded {} row(s).",
            self.table_name(),
            state.store.len()
        );
    }

    /// Reloads every row from the remote store.
    pub async fn refresh(&self) -> TableResult<usize> {
        self.ensure_alive()?;
        if !self.phase().is_idle() {
            warn!("Table '{}': refresh rejected, commit in flight.", self.table_name());
            return Err(TableError::Busy("commit"));
        }
        let remote = Rc::clone(&self.inner.collaborators.remote);
        let result = remote.fetch_all().await;
        self.ensure_alive()?;
        match result {
            Ok(fetched) => {
                let count = fetched.rows.len();
                self.replace_rows(fetched.rows, Some(fetched.total_count));
                info!("Table '{}': refreshed {} row(s).", self.table_name(), count);
                Ok(count)
            }
            Err(e) => {
                let msg = format!("Failed to load records: {}", e.describe());
                warn!("Table '{}': {}", self.table_name(), msg);
                self.feedback(msg, true);
                Err(TableError::RemoteRequest(e))
            }
        }
    }

    // ---- validation ----

    /// Validates the merged view and replaces the stored report. Returns the error count.
    pub fn revalidate(&self) -> usize {
        let mut state = self.state_mut();
        let merged = state.store.merged_rows();
        let report = validation::validate(&merged, &self.inner.schema);
        let count = report.error_count();
        state.report = report;
        state.rebuild_navigator();
        count
    }

    pub fn validation_report(&self) -> ValidationReport {
        self.state().report.clone()
    }

    /// `"i/n"` position of the current error, `"0/0"` when there are none.
    pub fn error_indicator(&self) -> String {
        self.state().navigator.current_indicator()
    }

    pub fn current_error(&self) -> Option<NavigationEntry> {
        self.state().navigator.current().cloned()
    }

    /// Moves to the next error (wrapping) and focuses its cell.
    pub fn next_error(&self) -> Option<NavigationEntry> {
        let entry = self.state_mut().navigator.next().cloned();
        if let Some(entry) = &entry {
            self.focus_entry(entry);
        }
        entry
    }

    /// Moves to the previous error (wrapping) and focuses its cell.
    pub fn previous_error(&self) -> Option<NavigationEntry> {
        let entry = self.state_mut().navigator.previous().cloned();
        if let Some(entry) = &entry {
            self.focus_entry(entry);
        }
        entry
    }

    fn focus_entry(&self, entry: &NavigationEntry) {
        if let Err(e) = self
            .inner
            .collaborators
            .focus
            .focus(&entry.row_id, &entry.field)
        {
            debug!(
                "Table '{}': focus on {}/{} failed, ignoring: {}",
                self.table_name(),
                entry.row_id,
                entry.field,
                e
            );
        }
    }

    // ---- display order ----

    pub fn set_row_order(&self, order: Vec<RowId>) {
        let mut state = self.state_mut();
        state.row_order = Some(order);
        state.rebuild_navigator();
    }

    pub fn set_column_order(&self, order: Vec<String>) {
        let mut state = self.state_mut();
        state.column_order = order;
        state.rebuild_navigator();
    }

    // ---- selection ----

    /// Selects a row. Unknown ids are ignored and return false.
    pub fn select(&self, id: &RowId) -> bool {
        let mut state = self.state_mut();
        if !state.store.contains(id) {
            debug!("Table '{}': select ignored stale row {}", self.table_name(), id);
            return false;
        }
        state.selection.select(id.clone())
    }

    pub fn deselect(&self, id: &RowId) -> bool {
        self.state_mut().selection.deselect(id)
    }

    /// Flips selection of a row; returns whether it is selected afterwards.
    pub fn toggle_selection(&self, id: &RowId) -> bool {
        let mut state = self.state_mut();
        if !state.store.contains(id) {
            return false;
        }
        state.selection.toggle(id.clone())
    }

    /// Replaces the selection, keeping only ids that exist.
    pub fn set_selection(&self, ids: impl IntoIterator<Item = RowId>) {
        let mut state = self.state_mut();
        let existing: Vec<RowId> = ids
            .into_iter()
            .filter(|id| state.store.contains(id))
            .collect();
        state.selection.replace(existing);
    }

    pub fn clear_selection(&self) {
        self.state_mut().selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<RowId> {
        self.state().selection.ids()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.state().selection.contains(id)
    }
}
