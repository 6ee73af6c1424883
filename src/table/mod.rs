// src/table/mod.rs

// --- Public Interface ---
pub mod collaborators;
pub mod controller;
pub mod definitions;
pub mod error;
pub mod events;
pub mod field_kind;
pub mod navigation;
pub mod record_store;
pub mod schema;
pub mod selection;
pub mod validation;

// Operations are `impl TableController` blocks; only their result types are public
pub(crate) mod logic;

pub use collaborators::{
    Collaborators, ConfirmationPrompt, DeleteReceipt, EditSurface, FetchResult,
    FocusScrollSink, NotificationSink, RemoteStore, TracingNotificationSink, UpsertReceipt,
};
pub use controller::{CommitPhase, TableController, WeakTableController};
pub use definitions::{FieldMap, Row, RowId, RowState, Value};
pub use error::{RemoteError, TableError, TableResult};
pub use events::{EditEvent, TableOperationFeedback};
pub use field_kind::FieldKind;
pub use logic::{CommitSummary, DeleteOutcome};
pub use navigation::NavigationEntry;
pub use schema::{DependencyChain, FieldDefinition, TableSchema};
pub use validation::{FieldError, ValidationReport};
