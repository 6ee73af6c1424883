// src/table/logic/update_cell.rs
use std::slice;
use tracing::{debug, trace};

use crate::table::controller::TableController;
use crate::table::definitions::{RowId, Value};
use crate::table::error::{TableError, TableResult};
use crate::table::events::EditEvent;
use crate::table::record_store::CloseEdit;

impl TableController {
    /// Single ingress for edit-surface notifications.
    ///
    /// Events naming rows that no longer exist are ignored. Every event wakes a commit
    /// waiting for rows to settle.
    pub fn handle_edit_event(&self, event: EditEvent) {
        if self.is_alive() {
            let result = match &event {
                EditEvent::Entered { row_id } => self.enter_edit(row_id),
                EditEvent::CellChanged {
                    row_id,
                    field,
                    value,
                } => self.write_cell(row_id, field, value.clone()),
                EditEvent::Exited { row_id, discard } => self.exit_edit(row_id, *discard),
            };
            if let Err(e) = result {
                debug!(
                    "Table '{}': ignoring edit event for row {}: {} ({:?})",
                    self.table_name(),
                    event.row_id(),
                    e,
                    event
                );
            }
        }
        self.inner.settle_signal.notify_one();
    }

    /// Coerces raw text for a field and writes it into the row's edit buffer.
    /// Text that does not fit the field kind is kept as `Value::Unparsable`.
    pub fn set_cell_text(&self, row_id: &RowId, field: &str, raw: &str) -> TableResult<()> {
        self.ensure_alive()?;
        let def = self
            .inner
            .schema
            .field(field)
            .ok_or_else(|| TableError::InvalidSchema(format!("unknown field '{}'", field)))?;
        if !def.editable {
            return Err(TableError::InvalidSchema(format!(
                "field '{}' is not editable",
                field
            )));
        }
        let value = def.kind.coerce(raw, &self.inner.settings.date_formats);
        self.state_mut().store.set_buffer_value(row_id, field, value)
    }

    fn enter_edit(&self, row_id: &RowId) -> TableResult<()> {
        if self.state_mut().store.open_edit(row_id)? {
            trace!("Table '{}': row {} entered edit mode", self.table_name(), row_id);
        }
        Ok(())
    }

    fn write_cell(&self, row_id: &RowId, field: &str, value: Option<Value>) -> TableResult<()> {
        if self.inner.schema.field(field).is_none() {
            return Err(TableError::InvalidSchema(format!(
                "unknown field '{}'",
                field
            )));
        }
        self.state_mut().store.set_buffer_value(row_id, field, value)
    }

    fn exit_edit(&self, row_id: &RowId, discard: bool) -> TableResult<()> {
        let outcome = self.state_mut().store.close_edit(row_id, discard)?;
        trace!(
            "Table '{}': row {} left edit mode: {:?}",
            self.table_name(),
            row_id,
            outcome
        );
        let report_shown = {
            let mut state = self.state_mut();
            if outcome == CloseEdit::RemovedAdded {
                state.forget_rows(slice::from_ref(row_id));
            }
            !state.report.is_empty()
        };
        // Errors disappear as soon as the user fixes them
        if report_shown {
            self.revalidate();
        }
        Ok(())
    }
}
