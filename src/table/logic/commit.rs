// src/table/logic/commit.rs
//! All-or-nothing save of every pending change.
//!
//! `Idle -> StoppingEdits -> AwaitingSettle -> Saving -> SaveSucceeded -> Idle`, with
//! `ValidationFailed` short-circuiting before any network call and
//! `SaveFailed -> RevertingEdits` putting modified rows back into edit mode.

use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::table::collaborators::UpsertReceipt;
use crate::table::controller::{CommitPhase, TableController};
use crate::table::definitions::Row;
use crate::table::error::{RemoteError, TableError, TableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Rows in the server's response.
    pub saved: usize,
    pub remote_count: u64,
}

impl TableController {
    /// Validates, settles every editing row, then upserts the full row set in one
    /// request. Always returns the commit phase to `Idle`.
    pub async fn commit(&self) -> TableResult<CommitSummary> {
        self.ensure_alive()?;
        if !self.phase().is_idle() {
            warn!("Table '{}': commit already in flight.", self.table_name());
            return Err(TableError::Busy("commit"));
        }
        if self.is_deleting() {
            warn!("Table '{}': commit rejected, deletion in flight.", self.table_name());
            return Err(TableError::Busy("deletion"));
        }

        let errors = self.revalidate();
        if errors > 0 {
            self.set_phase(CommitPhase::ValidationFailed);
            let msg = format!(
                "Cannot save '{}': {} validation error(s) must be fixed first.",
                self.table_name(),
                errors
            );
            warn!("{}", msg);
            self.feedback(msg, true);
            self.set_phase(CommitPhase::Idle);
            return Err(TableError::LocalValidation(errors));
        }

        let result = self.run_commit().await;
        self.set_phase(CommitPhase::Idle);
        result
    }

    async fn run_commit(&self) -> TableResult<CommitSummary> {
        self.set_phase(CommitPhase::StoppingEdits);
        let editing = self.editing_ids();
        for id in &editing {
            self.inner.collaborators.surface.request_exit_edit(id, false);
        }

        self.set_phase(CommitPhase::AwaitingSettle);
        self.await_settled(editing).await?;
        self.ensure_alive()?;

        self.set_phase(CommitPhase::Saving);
        let batch = self.rows();
        debug!(
            "Table '{}': upserting {} row(s).",
            self.table_name(),
            batch.len()
        );
        let remote = Rc::clone(&self.inner.collaborators.remote);
        let result = remote.upsert_batch(&batch).await;
        self.ensure_alive()?;

        match result {
            Ok(receipt) => Ok(self.apply_saved(receipt, &batch)),
            Err(e) => Err(self.reopen_after_failure(e)),
        }
    }

    /// Takes the server's rows. Edits started while the upsert was pending are
    /// kept and stay pending.
    fn apply_saved(&self, receipt: UpsertReceipt, sent: &[Row]) -> CommitSummary {
        self.set_phase(CommitPhase::SaveSucceeded);
        let saved = receipt.rows.len();
        let pending = {
            let mut state = self.state_mut();
            let pending = state.store.reconcile_saved(receipt.rows, sent);
            state.finish_reload(receipt.total_count);
            pending
        };
        let remote_count = self.remote_count().unwrap_or(saved as u64);
        if !pending.is_empty() {
            debug!(
                "Table '{}': {} row(s) changed during the save and remain unsaved.",
                self.table_name(),
                pending.len()
            );
        }

        let msg = format!("Saved {} record(s) to '{}'.", saved, self.table_name());
        info!("{}", msg);
        self.feedback(msg, false);
        CommitSummary {
            saved,
            remote_count,
        }
    }

    /// Puts every row with unsaved changes back into edit mode with its values intact.
    fn reopen_after_failure(&self, error: RemoteError) -> TableError {
        self.set_phase(CommitPhase::SaveFailed);
        warn!(
            "Table '{}': upsert rejected: {}",
            self.table_name(),
            error.describe()
        );

        self.set_phase(CommitPhase::RevertingEdits);
        let modified = self.modified_ids();
        for id in &modified {
            let opened = self.state_mut().store.open_edit(id);
            match opened {
                Ok(_) => self
                    .inner
                    .collaborators
                    .surface
                    .request_enter_edit(id, None),
                Err(e) => debug!("Table '{}': cannot reopen {}: {}", self.table_name(), id, e),
            }
        }

        let msg = format!("Failed to save records: {}", error.describe());
        self.feedback(msg, true);
        TableError::RemoteRequest(error)
    }
}
