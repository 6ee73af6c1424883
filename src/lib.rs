// src/lib.rs
//! Editable-record table synchronization engine.
//!
//! A [`TableController`] owns one table's rows, their edit lifecycle, validation,
//! selection and error navigation, and moves changes to a [`RemoteStore`] with
//! all-or-nothing commits and confirmed deletions. Rendering, prompts and
//! persistence are supplied by the host through the traits in
//! [`table::collaborators`].

pub mod database;
pub mod settings;
pub mod table;

pub use settings::EngineSettings;
pub use table::{
    Collaborators, CommitPhase, CommitSummary, ConfirmationPrompt, DeleteOutcome, EditEvent,
    EditSurface, FieldKind, FocusScrollSink, NotificationSink, RemoteError, RemoteStore, Row,
    RowId, RowState, TableController, TableError, TableOperationFeedback, TableResult,
    TableSchema, Value, WeakTableController,
};
