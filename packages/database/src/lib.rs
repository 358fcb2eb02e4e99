#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB` plumbing for the crash analysis pipeline.
//!
//! Input CSV files are registered as tables in an in-memory connection via
//! `read_csv_auto`, which also infers column types. Queries are plain SQL;
//! derived tables are written back out with `COPY ... TO`. The helpers in
//! [`extract`] turn result rows into the scalar and label values the
//! analysis layer returns.

pub mod export;
pub mod extract;
pub mod format;
pub mod load;
pub mod sql;

pub use export::copy_to;
pub use format::OutputFormat;
pub use load::{load_csv, open_in_memory, row_count};

/// Errors that can occur while loading, querying, or exporting tables.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error (load, bind, execution or export).
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error outside of `DuckDB` itself.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The requested output format is not supported.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub(crate) fn io_error(path: &std::path::Path, source: std::io::Error) -> DbError {
    DbError::Io {
        path: path.display().to_string(),
        source,
    }
}
