#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query identifiers and result types for the crash analysis battery.
//!
//! Each analytical question has a [`QueryId`]; running it yields a
//! [`QueryOutcome`]. The battery collects one [`QueryReport`] per query so
//! a failed query can be reported without hiding the others.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The six input datasets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum TableName {
    /// Charges filed per crash.
    Charges,
    /// Property damage per crash.
    Damages,
    /// License endorsements.
    Endorse,
    /// One row per person involved.
    #[serde(rename = "Primary_Person")]
    #[strum(serialize = "Primary_Person")]
    PrimaryPerson,
    /// One row per vehicle unit.
    Units,
    /// License restrictions.
    Restrict,
}

impl TableName {
    /// All six tables in load order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// One of the ten analytical questions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryId {
    /// Crashes where more than two males were killed.
    MaleFatalities,
    /// Crashes involving motorcycles.
    TwoWheelerCrashes,
    /// Top makes in fatal crashes where the airbag did not deploy.
    FatalNoAirbagMakes,
    /// Hit-and-run vehicles whose driver held a valid license.
    HitAndRunLicensed,
    /// State with the most crashes without female involvement.
    StateWithoutFemales,
    /// Makes ranked 3rd to 5th by total casualties.
    CasualtyMakes,
    /// Top ethnic group per vehicle body style.
    EthnicityByBodyStyle,
    /// Top zip codes for alcohol-related crashes.
    AlcoholZipCodes,
    /// Insured crashes with heavy vehicle damage and no property damage.
    UndamagedPropertyCrashes,
    /// Top makes for speeding offences among popular colors and states.
    SpeedingMakes,
}

impl QueryId {
    /// All queries in battery order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// 1-based position in the battery.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Looks up a query by snake-case id or by its 1-based number.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        key.parse().ok().or_else(|| {
            let n: u8 = key.parse().ok()?;
            Self::iter().find(|q| q.number() == n)
        })
    }

    /// One-line human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MaleFatalities => "Crashes in which more than 2 males were killed",
            Self::TwoWheelerCrashes => "Crashes involving two-wheelers",
            Self::FatalNoAirbagMakes => {
                "Top 5 vehicle makes in fatal crashes where airbags did not deploy"
            }
            Self::HitAndRunLicensed => "Hit-and-run vehicles with validly licensed drivers",
            Self::StateWithoutFemales => "State with the most crashes not involving females",
            Self::CasualtyMakes => "Vehicle makes ranked 3rd to 5th by injuries including death",
            Self::EthnicityByBodyStyle => "Top ethnic user group for each vehicle body style",
            Self::AlcoholZipCodes => "Top 5 driver zip codes for alcohol-related crashes",
            Self::UndamagedPropertyCrashes => {
                "Insured crashes with damage level above 4 and no damaged property"
            }
            Self::SpeedingMakes => {
                "Top 5 makes with speeding charges, licensed drivers, top colors and states"
            }
        }
    }
}

/// Body style paired with its most frequent ethnic group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyStyleEthnicity {
    /// Vehicle body style.
    pub body_style: String,
    /// Most frequent ethnicity among people in vehicles of that style.
    pub ethnicity: String,
}

/// The value a query returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// A row or distinct-key count.
    Count(u64),
    /// A single categorical value, which may be null.
    Label(Option<String>),
    /// Categorical values ordered by rank; entries may be null.
    Ranked(Vec<Option<String>>),
    /// A body-style to ethnicity mapping.
    Mapping(Vec<BodyStyleEthnicity>),
}

fn label(value: Option<&str>) -> &str {
    value.unwrap_or("<null>")
}

impl std::fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Label(value) => f.write_str(label(value.as_deref())),
            Self::Ranked(values) => {
                let parts: Vec<&str> = values.iter().map(|v| label(v.as_deref())).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Mapping(pairs) => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|p| format!("{} => {}", p.body_style, p.ethnicity))
                    .collect();
                write!(f, "{{{}}}", parts.join("; "))
            }
        }
    }
}

/// Whether a query in the battery succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    /// The query produced a result.
    Succeeded {
        /// The result.
        outcome: QueryOutcome,
    },
    /// The query failed; the rest of the battery still ran.
    Failed {
        /// Rendered error message.
        error: String,
    },
}

/// Summary of one query run within the battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    /// Which query ran.
    pub query: QueryId,
    /// Where its derived table was written, if anywhere.
    pub output: Option<String>,
    /// Outcome or error.
    #[serde(flatten)]
    pub status: ReportStatus,
}

impl QueryReport {
    /// Returns `true` if the query succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ReportStatus::Succeeded { .. })
    }
}
