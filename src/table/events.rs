// src/table/events.rs
use super::definitions::{RowId, Value};

/// Edit-mode notifications pushed by the editing surface into the controller.
/// Handled by `TableController::handle_edit_event`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// A row entered edit mode.
    Entered { row_id: RowId },
    /// A cell in an editing row changed. `None` clears the cell.
    CellChanged {
        row_id: RowId,
        field: String,
        value: Option<Value>,
    },
    /// A row left edit mode, keeping or discarding its buffer.
    Exited { row_id: RowId, discard: bool },
}

impl EditEvent {
    pub fn row_id(&self) -> &RowId {
        match self {
            EditEvent::Entered { row_id }
            | EditEvent::CellChanged { row_id, .. }
            | EditEvent::Exited { row_id, .. } => row_id,
        }
    }
}

/// User-facing outcome message, sent to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOperationFeedback {
    pub message: String,
    pub is_error: bool,
}

impl TableOperationFeedback {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}
