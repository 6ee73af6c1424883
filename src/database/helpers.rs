// src/database/helpers.rs
// SQL text generation for the record table

use super::error::{DbError, DbResult};

/// Quote a SQL identifier by wrapping it in double quotes.
/// Embedded quotes are doubled.
///
/// # Example
/// ```
/// use tablesync::database::helpers::quote_identifier;
/// assert_eq!(quote_identifier("Field Fixes"), "\"Field Fixes\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Table names come from host configuration; keep them to a safe character set.
pub fn check_table_name(name: &str) -> DbResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidTableName(name.to_string()))
    }
}

/// Build a string of SQL placeholders (?, ?, ?, ...).
///
/// # Example
/// ```
/// use tablesync::database::helpers::build_placeholders;
/// assert_eq!(build_placeholders(3), "?, ?, ?");
/// ```
pub fn build_placeholders(count: usize) -> String {
    (0..count).map(|_| "?").collect::<Vec<_>>().join(", ")
}

pub fn build_create_table_sql(table_name: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id TEXT PRIMARY KEY NOT NULL,
            row_index INTEGER NOT NULL,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        quote_identifier(table_name)
    )
}

/// Insert-or-replace of one row keyed by id.
pub fn build_upsert_sql(table_name: &str) -> String {
    format!(
        "INSERT INTO {} (id, row_index, data, updated_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET row_index = excluded.row_index, \
         data = excluded.data, updated_at = excluded.updated_at",
        quote_identifier(table_name)
    )
}

pub fn build_delete_sql(table_name: &str, count: usize) -> String {
    format!(
        "DELETE FROM {} WHERE id IN ({})",
        quote_identifier(table_name),
        build_placeholders(count)
    )
}

pub fn build_select_all_sql(table_name: &str) -> String {
    format!(
        "SELECT id, data FROM {} ORDER BY row_index, id",
        quote_identifier(table_name)
    )
}

pub fn build_count_sql(table_name: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_identifier(table_name))
}
