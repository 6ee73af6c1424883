// src/table/logic/settle.rs
//! Waiting for the edit surface to confirm rows have left edit mode.

use std::time::Duration;
use tracing::{trace, warn};

use crate::table::controller::TableController;
use crate::table::definitions::RowId;
use crate::table::error::{TableError, TableResult};

impl TableController {
    /// Resolves once none of `requested` is still editing. A row that disappeared
    /// counts as settled. Re-checked on every edit-surface event, never polled.
    pub(crate) async fn await_settled(&self, requested: Vec<RowId>) -> TableResult<()> {
        let mut pending = requested.clone();
        let wait = async move {
            loop {
                if !self.is_alive() {
                    return Err(TableError::TornDown);
                }
                pending.retain(|id| self.is_editing(id));
                if pending.is_empty() {
                    return Ok(());
                }
                trace!(
                    "Table '{}': waiting for {} row(s) to settle",
                    self.table_name(),
                    pending.len()
                );
                self.inner.settle_signal.notified().await;
            }
        };

        let Some(ms) = self.inner.settings.settle_timeout_ms else {
            return wait.await;
        };
        let outcome = tokio::time::timeout(Duration::from_millis(ms), wait).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                let stuck = requested.iter().filter(|id| self.is_editing(id)).count();
                let msg = format!(
                    "Save cancelled: {} record(s) did not leave edit mode within {} ms.",
                    stuck, ms
                );
                warn!("Table '{}': {}", self.table_name(), msg);
                self.feedback(msg, true);
                Err(TableError::SettleTimeout(stuck))
            }
        }
    }
}
