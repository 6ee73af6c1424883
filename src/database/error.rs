// src/database/error.rs

use thiserror::Error;

use crate::table::error::RemoteError;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),
    #[error("Invalid row data: {0}")]
    InvalidData(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Short machine-readable code passed on to the controller.
    pub fn code(&self) -> String {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code.to_string()
            }
            DbError::Sqlite(_) => "sqlite".to_string(),
            DbError::Io(_) => "io".to_string(),
            DbError::SerdeJson(_) => "json".to_string(),
            DbError::InvalidTableName(_) => "table_name".to_string(),
            DbError::InvalidData(_) => "invalid_data".to_string(),
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(e: DbError) -> Self {
        RemoteError::new("Database request failed")
            .with_code(e.code())
            .with_detail(e.to_string())
    }
}
