//! Output file formats.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::DbError;

/// On-disk format for derived tables.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Comma-separated values with a header row.
    #[default]
    Csv,
    /// Newline-delimited JSON objects.
    Json,
}

impl OutputFormat {
    /// File extension for this format (without the dot).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Option list for a `COPY ... TO` statement.
    #[must_use]
    pub const fn copy_options(self) -> &'static str {
        match self {
            Self::Csv => "FORMAT CSV, HEADER",
            Self::Json => "FORMAT JSON",
        }
    }

    /// Parses a user-supplied format name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnsupportedFormat`] for anything other than
    /// `csv` or `json`.
    pub fn parse(name: &str) -> Result<Self, DbError> {
        name.trim()
            .parse()
            .map_err(|_| DbError::UnsupportedFormat(name.to_owned()))
    }
}
