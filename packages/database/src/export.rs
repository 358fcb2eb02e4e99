//! Writing query results to disk.

use std::path::Path;

use duckdb::Connection;

use crate::{DbError, OutputFormat, io_error, sql};

/// Writes the rows produced by `query` to a single file at `path`,
/// replacing any existing file or directory there. Parent directories are
/// created as needed.
///
/// # Errors
///
/// Returns [`DbError`] if the target cannot be prepared or the `COPY`
/// fails.
pub fn copy_to(
    conn: &Connection,
    query: &str,
    path: &Path,
    format: OutputFormat,
) -> Result<(), DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    if path.is_dir() {
        std::fs::remove_dir_all(path).map_err(|e| io_error(path, e))?;
    } else if path.exists() {
        std::fs::remove_file(path).map_err(|e| io_error(path, e))?;
    }

    conn.execute_batch(&format!(
        "COPY ({query}) TO {} ({})",
        sql::path_literal(path),
        format.copy_options(),
    ))?;

    log::debug!("Wrote {format} output to {}", path.display());
    Ok(())
}
