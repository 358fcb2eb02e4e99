//! Opening connections and registering CSV files as tables.

use std::path::Path;

use duckdb::Connection;

use crate::{DbError, io_error, sql};

/// Opens an empty in-memory database.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if `DuckDB` fails to initialize.
pub fn open_in_memory() -> Result<Connection, DbError> {
    Ok(Connection::open_in_memory()?)
}

/// Creates table `name` from the CSV file at `path`, replacing any
/// existing table of that name.
///
/// The file must have a header row. Column types are inferred by
/// `read_csv_auto`; empty fields load as null.
///
/// # Errors
///
/// Returns [`DbError::Io`] if the file does not exist, or
/// [`DbError::DuckDb`] if `DuckDB` cannot parse it.
pub fn load_csv(conn: &Connection, name: &str, path: &Path) -> Result<u64, DbError> {
    std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    conn.execute_batch(&format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto({}, header = true)",
        sql::ident(name),
        sql::path_literal(path),
    ))?;

    let rows = row_count(conn, name)?;
    log::debug!("Loaded {rows} rows into {name} from {}", path.display());
    Ok(rows)
}

/// Number of rows in table `name`.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if the table does not exist.
pub fn row_count(conn: &Connection, name: &str) -> Result<u64, DbError> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", sql::ident(name)),
        [],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or_default())
}
