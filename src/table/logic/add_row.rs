// src/table/logic/add_row.rs
use tracing::{info, warn};

use crate::table::controller::TableController;
use crate::table::definitions::RowId;
use crate::table::error::{TableError, TableResult};

impl TableController {
    /// Appends a blank, never-committed row and puts it into edit mode on the
    /// schema's first edit field.
    pub fn add_record(&self) -> TableResult<RowId> {
        self.ensure_alive()?;
        if !self.phase().is_idle() {
            let msg = format!(
                "Cannot add a record to '{}' while changes are being saved.",
                self.table_name()
            );
            warn!("{}", msg);
            self.feedback(msg, true);
            return Err(TableError::Busy("commit"));
        }

        let id = RowId::generate();
        {
            let mut state = self.state_mut();
            state
                .store
                .push_added(id.clone(), self.inner.schema.blank_fields());
            state.store.open_edit(&id)?;
            state.rebuild_navigator();
        }

        let msg = format!("Added new record to '{}'.", self.table_name());
        info!("{} (id {})", msg, id);
        self.inner
            .collaborators
            .surface
            .request_enter_edit(&id, self.inner.schema.first_edit_field());
        self.feedback(msg, false);
        Ok(id)
    }
}
