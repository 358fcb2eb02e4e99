#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytical queries over the crash datasets.
//!
//! The six input tables are loaded once into an in-memory `DuckDB`
//! database wrapped by [`CrashTables`]. Each function in [`queries`]
//! answers one question with SQL against that context, optionally writes
//! its derived table, and returns its result or an [`AnalysisError`]. A failing query never affects another; the
//! [`battery`] runs any subset and reports each outcome separately.

pub mod battery;
pub mod columns;
pub mod context;
#[cfg(test)]
mod fixtures;
pub mod progress;
pub mod queries;
pub mod ranking;

pub use battery::run_battery;
pub use context::CrashTables;

use crash_analysis_models::QueryId;
use crash_analysis_database::DbError;

/// Errors that can occur while running a single query.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The query failed to bind or execute, or its output could not be
    /// written.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// The query needed at least one row and found none.
    #[error("Query {0} produced no rows")]
    EmptyResult(QueryId),
}
