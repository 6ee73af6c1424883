// src/database/sqlite_store.rs
//! SQLite-backed `RemoteStore`.
//!
//! One table per schema: `(id, row_index, data, updated_at)` where `data` holds the
//! row's fields as JSON. Every batch write runs in a single transaction, and every
//! response re-reads the table so the controller receives authoritative rows.

use rusqlite::{params, params_from_iter, Connection};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::error::{DbError, DbResult};
use super::helpers::{
    build_count_sql, build_create_table_sql, build_delete_sql, build_select_all_sql,
    build_upsert_sql, check_table_name,
};
use crate::table::collaborators::{DeleteReceipt, FetchResult, RemoteStore, UpsertReceipt};
use crate::table::definitions::{FieldMap, Row, RowId};
use crate::table::error::RemoteError;

// Well under SQLITE_MAX_VARIABLE_NUMBER on every supported build
const DELETE_CHUNK: usize = 500;

pub struct SqliteRemoteStore {
    conn: RefCell<Connection>,
    table: String,
}

impl SqliteRemoteStore {
    /// Opens (or creates) a database file with WAL journaling.
    pub fn open(path: &Path, table: &str) -> DbResult<Self> {
        let conn = Connection::open(path)?;

        // PRAGMA journal_mode=WAL returns the mode that was set
        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if journal_mode.to_uppercase() != "WAL" {
            warn!(
                "Failed to set WAL mode on database {:?}. Current mode: {}",
                path.file_name(),
                journal_mode
            );
        } else {
            debug!("WAL mode activated for database {:?}", path.file_name());
        }
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::from_connection(conn, table)
    }

    pub fn open_in_memory(table: &str) -> DbResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, table)
    }

    fn from_connection(conn: Connection, table: &str) -> DbResult<Self> {
        check_table_name(table)?;
        conn.execute_batch(&build_create_table_sql(table))?;
        info!("SqliteRemoteStore: table '{}' ready.", table);
        Ok(Self {
            conn: RefCell::new(conn),
            table: table.to_string(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Every stored row, in saved order.
    pub fn read_all(&self) -> DbResult<Vec<Row>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&build_select_all_sql(&self.table))?;
        let mapped = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
        let mut rows = Vec::new();
        for item in mapped {
            let (id, data) = item?;
            let fields: FieldMap = serde_json::from_str(&data)?;
            rows.push(Row::persisted(id, fields));
        }
        Ok(rows)
    }

    pub fn count(&self) -> DbResult<u64> {
        let conn = self.conn.borrow();
        let n: i64 = conn.query_row(&build_count_sql(&self.table), [], |r| r.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Writes the batch in one transaction. Row order in the batch becomes the
    /// stored order. Returns the table contents afterwards.
    pub fn upsert_rows(&self, rows: &[Row]) -> DbResult<Vec<Row>> {
        let mut seen = HashSet::new();
        if let Some(dup) = rows.iter().find(|r| !seen.insert(&r.id)) {
            return Err(DbError::InvalidData(format!("duplicate id '{}'", dup.id)));
        }

        let now = chrono::Utc::now().to_rfc3339();
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(&build_upsert_sql(&self.table))?;
                for (index, row) in rows.iter().enumerate() {
                    let data = serde_json::to_string(&row.fields)?;
                    stmt.execute(params![row.id.as_str(), index as i64, data, now])?;
                }
            }
            tx.commit()?;
        }
        debug!(
            "SqliteRemoteStore: upserted {} row(s) into '{}'.",
            rows.len(),
            self.table
        );
        self.read_all()
    }

    /// Deletes the given ids in one transaction. Returns the remaining row count.
    pub fn delete_rows(&self, ids: &[RowId]) -> DbResult<u64> {
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction()?;
            for chunk in ids.chunks(DELETE_CHUNK) {
                let mut stmt = tx.prepare(&build_delete_sql(&self.table, chunk.len()))?;
                stmt.execute(params_from_iter(chunk.iter().map(|id| id.as_str())))?;
            }
            tx.commit()?;
        }
        debug!(
            "SqliteRemoteStore: deleted {} row(s) from '{}'.",
            ids.len(),
            self.table
        );
        self.count()
    }
}

#[async_trait::async_trait(?Send)]
impl RemoteStore for SqliteRemoteStore {
    async fn fetch_all(&self) -> Result<FetchResult, RemoteError> {
        let rows = self.read_all()?;
        let total_count = rows.len() as u64;
        Ok(FetchResult { rows, total_count })
    }

    async fn upsert_batch(&self, rows: &[Row]) -> Result<UpsertReceipt, RemoteError> {
        let rows = self.upsert_rows(rows)?;
        Ok(UpsertReceipt {
            total_count: Some(rows.len() as u64),
            rows,
        })
    }

    async fn delete_batch(&self, ids: &[RowId]) -> Result<DeleteReceipt, RemoteError> {
        let updated_count = self.delete_rows(ids)?;
        Ok(DeleteReceipt { updated_count })
    }
}
