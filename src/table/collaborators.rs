// src/table/collaborators.rs
//! Seams between the controller and the outside world.
//!
//! The controller is single-threaded, so the async traits are `?Send` and the
//! collaborators are shared as `Rc<dyn ...>`.

use std::rc::Rc;
use tracing::{error, info};

use super::definitions::{Row, RowId};
use super::error::RemoteError;
use super::events::TableOperationFeedback;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub rows: Vec<Row>,
    pub total_count: u64,
}

/// Authoritative rows returned by a successful upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertReceipt {
    pub rows: Vec<Row>,
    /// Row count reported by the server, when it sends one.
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReceipt {
    /// Total row count remaining on the server after the delete.
    pub updated_count: u64,
}

/// Remote persistence. Every call resolves exactly once.
#[async_trait::async_trait(?Send)]
pub trait RemoteStore {
    async fn fetch_all(&self) -> Result<FetchResult, RemoteError>;

    /// Upserts the full row set in one request.
    async fn upsert_batch(&self, rows: &[Row]) -> Result<UpsertReceipt, RemoteError>;

    /// Deletes persisted rows in one request.
    async fn delete_batch(&self, ids: &[RowId]) -> Result<DeleteReceipt, RemoteError>;
}

/// The grid widget hosting edit mode. Requests are fire-and-forget; the surface
/// answers later through `EditEvent`s.
pub trait EditSurface {
    fn request_enter_edit(&self, row_id: &RowId, focus_field: Option<&str>);
    fn request_exit_edit(&self, row_id: &RowId, discard: bool);
}

pub trait NotificationSink {
    fn notify(&self, feedback: &TableOperationFeedback);
}

pub trait FocusScrollSink {
    /// Scrolls to and focuses one cell. Failures are not fatal.
    fn focus(&self, row_id: &RowId, field: &str) -> Result<(), String>;
}

#[async_trait::async_trait(?Send)]
pub trait ConfirmationPrompt {
    async fn ask(&self, message: &str) -> bool;
}

/// Notification sink that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, feedback: &TableOperationFeedback) {
        if feedback.is_error {
            error!("{}", feedback.message);
        } else {
            info!("{}", feedback.message);
        }
    }
}

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub remote: Rc<dyn RemoteStore>,
    pub surface: Rc<dyn EditSurface>,
    pub notifier: Rc<dyn NotificationSink>,
    pub focus: Rc<dyn FocusScrollSink>,
    pub confirm: Rc<dyn ConfirmationPrompt>,
}
