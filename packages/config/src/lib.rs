#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TOML configuration for the crash analysis battery.
//!
//! ```toml
//! [INPUT_FILENAME]
//! Charges = "data/Charges_use.csv"
//! Damages = "data/Damages_use.csv"
//! Endorse = "data/Endorse_use.csv"
//! Primary_Person = "data/Primary_Person_use.csv"
//! Units = "data/Units_use.csv"
//! Restrict = "data/Restrict_use.csv"
//!
//! [OUTPUT_PATH]
//! male_fatalities = "output/1.csv"
//! 2 = "output/2.csv"
//!
//! [FILE_FORMAT]
//! Output = "csv"
//! ```
//!
//! `OUTPUT_PATH` keys are query ids or 1-based query numbers. Relative
//! paths resolve against the directory containing the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crash_analysis_models::{QueryId, TableName};
use crash_analysis_database::{DbError, OutputFormat};
use serde::Deserialize;

/// Environment variable consulted when no config path is given explicitly.
pub const CONFIG_ENV_VAR: &str = "CRASH_ANALYSIS_CONFIG";

/// Config file used when neither a flag nor [`CONFIG_ENV_VAR`] is set.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Directory for query outputs that have no explicit `OUTPUT_PATH` entry.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Errors raised while reading configuration or building the analysis
/// context from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Config file path.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// `INPUT_FILENAME` has no entry for a required table.
    #[error("INPUT_FILENAME is missing an entry for {0}")]
    MissingInput(TableName),

    /// The configured output format is not supported.
    #[error("Invalid FILE_FORMAT: {0}")]
    Format(DbError),

    /// The in-memory database backing the analysis context could not be
    /// opened.
    #[error("Failed to open database: {0}")]
    Database(#[from] DbError),

    /// An input table failed to load while constructing the analysis
    /// context.
    #[error("Error loading {table} table: {source}")]
    TableLoad {
        /// Which table failed.
        table: TableName,
        /// Underlying load failure.
        source: DbError,
    },
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(rename = "INPUT_FILENAME")]
    input_filename: BTreeMap<String, PathBuf>,
    #[serde(rename = "OUTPUT_PATH", default)]
    output_path: BTreeMap<String, PathBuf>,
    #[serde(rename = "FILE_FORMAT", default)]
    file_format: RawFileFormat,
}

#[derive(Debug, Default, Deserialize)]
struct RawFileFormat {
    #[serde(rename = "Output", default)]
    output: Option<String>,
}

/// Paths of the six input CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    paths: BTreeMap<TableName, PathBuf>,
}

impl InputPaths {
    /// Builds the mapping, requiring every table to be present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingInput`] for the first absent table.
    pub fn new(paths: BTreeMap<TableName, PathBuf>) -> Result<Self, ConfigError> {
        if let Some(missing) = TableName::all().into_iter().find(|t| !paths.contains_key(t)) {
            return Err(ConfigError::MissingInput(missing));
        }
        Ok(Self { paths })
    }

    /// Path of one input table.
    #[must_use]
    pub fn get(&self, table: TableName) -> &Path {
        // `new` guarantees every table is present.
        self.paths.get(&table).map_or_else(|| Path::new(""), PathBuf::as_path)
    }
}

/// Where and how to persist one query's derived table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Output file path.
    pub path: PathBuf,
    /// Output file format.
    pub format: OutputFormat,
}

impl OutputTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Input table paths.
    pub inputs: InputPaths,
    /// Output format shared by every query.
    pub format: OutputFormat,
    outputs: BTreeMap<QueryId, PathBuf>,
    base_dir: PathBuf,
}

impl AnalysisConfig {
    /// Reads and resolves a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::parse(&text, base_dir).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses config text, resolving relative paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is invalid.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;

        let mut inputs = BTreeMap::new();
        for (key, path) in raw.input_filename {
            match key.parse::<TableName>() {
                Ok(table) => {
                    inputs.insert(table, resolve(base_dir, &path));
                }
                Err(_) => log::warn!("Ignoring unknown INPUT_FILENAME entry '{key}'"),
            }
        }

        let mut outputs = BTreeMap::new();
        for (key, path) in raw.output_path {
            match QueryId::from_key(&key) {
                Some(query) => {
                    outputs.insert(query, resolve(base_dir, &path));
                }
                None => log::warn!("Ignoring unknown OUTPUT_PATH entry '{key}'"),
            }
        }

        let format = raw
            .file_format
            .output
            .as_deref()
            .map(OutputFormat::parse)
            .transpose()
            .map_err(ConfigError::Format)?
            .unwrap_or_default();

        Ok(Self {
            inputs: InputPaths::new(inputs)?,
            format,
            outputs,
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Output target for a query: its `OUTPUT_PATH` entry, or
    /// `output/<query id>.<ext>` next to the config file.
    #[must_use]
    pub fn output_target(&self, query: QueryId) -> OutputTarget {
        let path = self.outputs.get(&query).cloned().unwrap_or_else(|| {
            self.base_dir
                .join(DEFAULT_OUTPUT_DIR)
                .join(format!("{query}.{}", self.format.extension()))
        });
        OutputTarget::new(path, self.format)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Picks the config file: an explicit path, else [`CONFIG_ENV_VAR`], else
/// [`DEFAULT_CONFIG_FILE`].
#[must_use]
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[INPUT_FILENAME]
Charges = "data/Charges_use.csv"
Damages = "data/Damages_use.csv"
Endorse = "data/Endorse_use.csv"
Primary_Person = "data/Primary_Person_use.csv"
Units = "/abs/Units_use.csv"
Restrict = "data/Restrict_use.csv"

[OUTPUT_PATH]
1 = "out/one.csv"
speeding_makes = "out/ten.csv"

[FILE_FORMAT]
Output = "json"
"#;

    #[test]
    fn parses_full_config() {
        let config = AnalysisConfig::parse(FULL, Path::new("/base")).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(
            config.inputs.get(TableName::PrimaryPerson),
            Path::new("/base/data/Primary_Person_use.csv")
        );
        assert_eq!(config.inputs.get(TableName::Units), Path::new("/abs/Units_use.csv"));
        assert_eq!(
            config.output_target(QueryId::MaleFatalities).path,
            PathBuf::from("/base/out/one.csv")
        );
        assert_eq!(
            config.output_target(QueryId::SpeedingMakes).path,
            PathBuf::from("/base/out/ten.csv")
        );
    }

    #[test]
    fn defaults_output_path_and_format() {
        let text = FULL
            .split("[OUTPUT_PATH]")
            .next()
            .unwrap()
            .to_string();
        let config = AnalysisConfig::parse(&text, Path::new("cfg")).unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(
            config.output_target(QueryId::AlcoholZipCodes),
            OutputTarget::new("cfg/output/alcohol_zip_codes.csv", OutputFormat::Csv)
        );
    }

    #[test]
    fn missing_table_is_rejected() {
        let text = FULL.replace("Restrict = \"data/Restrict_use.csv\"\n", "");
        assert!(matches!(
            AnalysisConfig::parse(&text, Path::new("")),
            Err(ConfigError::MissingInput(TableName::Restrict))
        ));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let text = FULL.replace("\"json\"", "\"parquet\"");
        assert!(matches!(
            AnalysisConfig::parse(&text, Path::new("")),
            Err(ConfigError::Format(DbError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn missing_input_section_is_a_parse_error() {
        assert!(matches!(
            AnalysisConfig::parse("[FILE_FORMAT]\nOutput = \"csv\"\n", Path::new("")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_config_path_wins() {
        assert_eq!(
            config_path(Some(PathBuf::from("custom.toml"))),
            PathBuf::from("custom.toml")
        );
    }
}
