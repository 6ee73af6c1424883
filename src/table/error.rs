// src/table/error.rs

use thiserror::Error;

use super::definitions::RowId;

/// Structured failure reported by the remote store.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub detail: Option<String>,
    pub code: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            code: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Message plus whatever detail the remote store provided, for user feedback.
    pub fn describe(&self) -> String {
        match (&self.code, &self.detail) {
            (Some(code), Some(detail)) => format!("{} [{}]: {}", self.message, code, detail),
            (None, Some(detail)) => format!("{}: {}", self.message, detail),
            (Some(code), None) => format!("{} [{}]", self.message, code),
            (None, None) => self.message.clone(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("{0} validation error(s) must be fixed before saving")]
    LocalValidation(usize),
    #[error("remote request failed: {}", .0.describe())]
    RemoteRequest(#[from] RemoteError),
    #[error("failed to delete {failed} persisted record(s); {removed_local} local record(s) were removed")]
    PartialDelete {
        removed_local: usize,
        failed: usize,
        #[source]
        source: RemoteError,
    },
    #[error("row '{0}' no longer exists")]
    StaleReference(RowId),
    #[error("a {0} is already in flight")]
    Busy(&'static str),
    #[error("timed out waiting for {0} row(s) to leave edit mode")]
    SettleTimeout(usize),
    #[error("invalid table schema: {0}")]
    InvalidSchema(String),
    #[error("table controller has been torn down")]
    TornDown,
}

pub type TableResult<T> = Result<T, TableError>;
