// src/table/logic/delete_rows.rs
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::table::controller::TableController;
use crate::table::definitions::{RowId, RowState};
use crate::table::error::{TableError, TableResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No requested id named an existing row.
    NothingToDelete,
    /// The user declined the confirmation.
    Cancelled,
    /// Rows removed: `local` never reached the server, `remote` were deleted there.
    Deleted { local: usize, remote: usize },
}

impl TableController {
    /// Confirms with the user, then deletes the given rows. Rows that were never
    /// committed are dropped locally; the rest go to the remote store in one request.
    ///
    /// A deletion confirmed while a commit is running waits for the commit to finish.
    pub async fn request_delete(&self, ids: &[RowId]) -> TableResult<DeleteOutcome> {
        self.ensure_alive()?;
        let targets: Vec<RowId> = {
            let state = self.state();
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| state.store.contains(id) && seen.insert((*id).clone()))
                .cloned()
                .collect()
        };
        if targets.is_empty() {
            debug!(
                "Table '{}': delete requested with no existing rows.",
                self.table_name()
            );
            return Ok(DeleteOutcome::NothingToDelete);
        }

        {
            let mut state = self.state_mut();
            if state.deletion_in_flight {
                warn!("Table '{}': deletion already in flight.", self.table_name());
                return Err(TableError::Busy("deletion"));
            }
            state.deletion_in_flight = true;
        }
        let result = self.run_delete(targets).await;
        self.state_mut().deletion_in_flight = false;
        result
    }

    async fn run_delete(&self, targets: Vec<RowId>) -> TableResult<DeleteOutcome> {
        let question = self.inner.settings.confirmation_message(targets.len());
        let confirm = Rc::clone(&self.inner.collaborators.confirm);
        let confirmed = confirm.ask(&question).await;
        self.ensure_alive()?;
        if !confirmed {
            info!("Table '{}': deletion cancelled by user.", self.table_name());
            return Ok(DeleteOutcome::Cancelled);
        }
        self.state_mut().selection.prune(&targets);

        if !self.phase().is_idle() {
            debug!(
                "Table '{}': deletion queued until the running commit finishes.",
                self.table_name()
            );
            let mut phase = self.subscribe_phase();
            phase
                .wait_for(|p| p.is_idle())
                .await
                .map_err(|_| TableError::TornDown)?;
            self.ensure_alive()?;
        }

        // Partition after any wait: a commit may have persisted added rows
        let (local, remote): (Vec<RowId>, Vec<RowId>) = {
            let state = self.state();
            targets
                .into_iter()
                .filter(|id| state.store.contains(id))
                .partition(|id| state.store.state(id) == Some(RowState::Added))
        };

        let mut updated_count = None;
        if !remote.is_empty() {
            let store = Rc::clone(&self.inner.collaborators.remote);
            let result = store.delete_batch(&remote).await;
            self.ensure_alive()?;
            match result {
                Ok(receipt) => updated_count = Some(receipt.updated_count),
                Err(e) => {
                    let removed_local = self.remove_rows(&local);
                    let msg = format!(
                        "Failed to delete {} record(s): {}",
                        remote.len(),
                        e.describe()
                    );
                    warn!("Table '{}': {}", self.table_name(), msg);
                    self.feedback(msg, true);
                    return Err(TableError::PartialDelete {
                        removed_local,
                        failed: remote.len(),
                        source: e,
                    });
                }
            }
        }

        let all: Vec<RowId> = local.iter().chain(remote.iter()).cloned().collect();
        self.remove_rows(&all);
        if let Some(count) = updated_count {
            self.state_mut().remote_count = Some(count);
        }

        let msg = format!("Deleted {} record(s) from '{}'.", all.len(), self.table_name());
        info!("{}", msg);
        self.feedback(msg, false);
        Ok(DeleteOutcome::Deleted {
            local: local.len(),
            remote: remote.len(),
        })
    }

    fn remove_rows(&self, ids: &[RowId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let mut state = self.state_mut();
        let removed = state.store.remove(ids);
        state.forget_rows(&removed);
        removed.len()
    }
}
