//! Result extraction.
//!
//! Query results are read back as text labels: every cell is rendered the
//! way it would appear in an exported CSV, with SQL `NULL` as `None`.

use duckdb::Connection;
use duckdb::types::Value;

use crate::{DbError, sql};

/// Number of rows produced by `query`.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if the query fails to bind or execute.
pub fn count_rows(conn: &Connection, query: &str) -> Result<u64, DbError> {
    scalar_count(conn, &format!("SELECT COUNT(*) FROM ({query})"))
}

/// Number of distinct non-null values of `column` in the rows produced by
/// `query`.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if the query fails to bind or execute.
pub fn count_distinct(conn: &Connection, query: &str, column: &str) -> Result<u64, DbError> {
    scalar_count(
        conn,
        &format!("SELECT COUNT(DISTINCT {}) FROM ({query})", sql::ident(column)),
    )
}

fn scalar_count(conn: &Connection, statement: &str) -> Result<u64, DbError> {
    let count: i64 = conn.query_row(statement, [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// First column of every row produced by `query`, in result order.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if the query fails to bind or execute.
pub fn labels(conn: &Connection, query: &str) -> Result<Vec<Option<String>>, DbError> {
    Ok(text_rows::<1>(conn, query)?
        .into_iter()
        .map(|[label]| label)
        .collect())
}

/// First `N` columns of every row produced by `query`, in result order.
///
/// # Errors
///
/// Returns [`DbError::DuckDb`] if the query fails, or produces fewer than
/// `N` columns.
pub fn text_rows<const N: usize>(
    conn: &Connection,
    query: &str,
) -> Result<Vec<[Option<String>; N]>, DbError> {
    let mut stmt = conn.prepare(query)?;
    let rows = stmt
        .query_map([], |row| {
            let mut cells: [Option<String>; N] = std::array::from_fn(|_| None);
            for (i, cell) in cells.iter_mut().enumerate() {
                *cell = render(row.get::<_, Value>(i)?);
            }
            Ok(cells)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn render(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s),
        Value::Boolean(v) => Some(v.to_string()),
        Value::TinyInt(v) => Some(v.to_string()),
        Value::SmallInt(v) => Some(v.to_string()),
        Value::Int(v) => Some(v.to_string()),
        Value::BigInt(v) => Some(v.to_string()),
        Value::HugeInt(v) => Some(v.to_string()),
        Value::UTinyInt(v) => Some(v.to_string()),
        Value::USmallInt(v) => Some(v.to_string()),
        Value::UInt(v) => Some(v.to_string()),
        Value::UBigInt(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Double(v) => Some(v.to_string()),
        other => Some(format!("{other:?}")),
    }
}
