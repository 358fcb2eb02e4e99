//! The immutable set of input tables every query reads from.

use crash_analysis_config::{ConfigError, InputPaths};
use crash_analysis_database::{DbError, load_csv, open_in_memory, row_count, sql};
use crash_analysis_models::TableName;
use duckdb::Connection;

/// The six crash datasets, registered once as tables of an in-memory
/// `DuckDB` database and only read afterwards.
///
/// Each table is named after its [`TableName`] (`Primary_Person`, `Units`,
/// ...). The connection is `Send` but not `Sync`; share a context between
/// threads by giving each thread its own.
#[derive(Debug)]
pub struct CrashTables {
    conn: Connection,
}

impl CrashTables {
    /// Loads every input CSV into a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TableLoad`] naming the first table that fails
    /// to load, or [`ConfigError::Database`] if the database cannot be
    /// opened.
    pub fn load(inputs: &InputPaths) -> Result<Self, ConfigError> {
        let conn = open_in_memory()?;

        for table in TableName::all() {
            let path = inputs.get(table);
            let rows = load_csv(&conn, table.as_ref(), path)
                .map_err(|source| ConfigError::TableLoad { table, source })?;
            log::info!("Loaded {table}: {rows} rows from {}", path.display());
        }

        Ok(Self { conn })
    }

    /// The connection the tables are registered in.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Quoted SQL reference to one of the input tables.
    #[must_use]
    pub fn table(table: TableName) -> String {
        sql::ident(table.as_ref())
    }

    /// Row count of every table, in load order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a table can no longer be read.
    pub fn row_counts(&self) -> Result<Vec<(TableName, u64)>, DbError> {
        TableName::all()
            .into_iter()
            .map(|t| row_count(&self.conn, t.as_ref()).map(|rows| (t, rows)))
            .collect()
    }
}
