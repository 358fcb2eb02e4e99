//! Column names and category values shared by several queries.
//!
//! Column names that only appear inside one query's SQL are written
//! inline there.

/// Crash identifier shared by every table; the join key.
pub const CRASH_ID: &str = "CRASH_ID";

/// Derived per-unit casualty total (`TOT_INJRY_CNT + DEATH_CNT`).
pub const TOT_CASUALTIES_CNT: &str = "TOT_CASUALTIES_CNT";

/// Per-make sum of [`TOT_CASUALTIES_CNT`].
pub const TOT_CASUALTIES_CNT_AGG: &str = "TOT_CASUALTIES_CNT_AGG";

// ── Category values ──────────────────────────────────────────────────────

/// Placeholder for a missing categorical value.
pub const NA: &str = "NA";

/// License types that count as a valid license.
pub const VALID_LICENSE_TYPES: &[&str] = &["DRIVER LICENSE", "COMMERCIAL DRIVER LIC."];

/// Body styles that carry no information. The dataset spells the last one
/// with two spaces; both spellings are excluded.
pub const UNINFORMATIVE_BODY_STYLES: &[&str] = &[
    "NA",
    "UNKNOWN",
    "NOT REPORTED",
    "OTHER (EXPLAIN IN NARRATIVE)",
    "OTHER  (EXPLAIN IN NARRATIVE)",
];

/// Ethnicities that carry no information.
pub const UNINFORMATIVE_ETHNICITIES: &[&str] = &["NA", "UNKNOWN"];

/// Damage scales above this compare as severe (lexicographic comparison).
pub const DAMAGE_SCALE_THRESHOLD: &str = "DAMAGED 4";

/// Damage scale values that never count as severe.
pub const INVALID_DAMAGE_SCALES: &[&str] = &["NA", "NO DAMAGE", "INVALID VALUE"];

/// Financial responsibility type for insured vehicles.
pub const LIABILITY_INSURANCE: &str = "PROOF OF LIABILITY INSURANCE";
