// src/table/logic/revert.rs
use tracing::{info, warn};

use crate::table::controller::TableController;
use crate::table::error::{TableError, TableResult};
use crate::table::validation::ValidationReport;

impl TableController {
    /// Throws away every uncommitted change: added rows vanish, edited rows return
    /// to their last committed values, open edits are discarded. Returns the number
    /// of rows touched.
    pub fn revert_all(&self) -> TableResult<usize> {
        self.ensure_alive()?;
        if !self.phase().is_idle() {
            warn!(
                "Table '{}': revert rejected, commit in flight.",
                self.table_name()
            );
            return Err(TableError::Busy("commit"));
        }

        let editing = self.editing_ids();
        let touched = {
            let mut state = self.state_mut();
            let touched = state.store.revert_all();
            state.report = ValidationReport::new();
            state.prune_selection();
            state.rebuild_navigator();
            touched
        };
        for id in &editing {
            self.inner.collaborators.surface.request_exit_edit(id, true);
        }

        let msg = format!(
            "Reverted {} record(s) in '{}'.",
            touched,
            self.table_name()
        );
        info!("{}", msg);
        self.feedback(msg, false);
        Ok(touched)
    }
}
