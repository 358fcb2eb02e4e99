//! The analytical questions.
//!
//! Every query is a SQL statement over the tables registered in
//! [`CrashTables`]. It derives a new table, writes it to `output` when one
//! is given, and returns its answer. Any failure (unknown column, bind
//! error, write error) is returned as an [`AnalysisError`] instead of the
//! answer.
//!
//! Predicates follow SQL null semantics: a comparison against a null cell
//! drops the row. String comparisons are case-sensitive. Columns are
//! qualified by table alias after a join because the person and unit
//! tables share several column names.

use crash_analysis_config::OutputTarget;
use crash_analysis_database::extract::{count_distinct, count_rows, labels, text_rows};
use crash_analysis_database::{copy_to, sql};
use crash_analysis_models::{BodyStyleEthnicity, QueryId, QueryOutcome, TableName};

use crate::columns::{
    CRASH_ID, DAMAGE_SCALE_THRESHOLD, INVALID_DAMAGE_SCALES, LIABILITY_INSURANCE, NA,
    TOT_CASUALTIES_CNT, TOT_CASUALTIES_CNT_AGG, UNINFORMATIVE_BODY_STYLES,
    UNINFORMATIVE_ETHNICITIES, VALID_LICENSE_TYPES,
};
use crate::ranking::{COUNT_COLUMN, count_by, rank_by_count, top_by_count, top_within_groups};
use crate::{AnalysisError, CrashTables};

/// Makes reported by the make rankings.
const TOP_MAKES: usize = 5;

/// Casualty ranks skipped before the reported makes.
const CASUALTY_RANKS_SKIPPED: usize = 2;

/// License states eligible for the speeding ranking.
const TOP_LICENSE_STATES: usize = 25;

/// Vehicle colors eligible for the speeding ranking.
const TOP_COLORS: usize = 10;

/// Zip codes reported for alcohol crashes.
const TOP_ZIP_CODES: usize = 5;

fn persist(
    tables: &CrashTables,
    query: &str,
    output: Option<&OutputTarget>,
) -> Result<(), AnalysisError> {
    if let Some(target) = output {
        copy_to(tables.connection(), query, &target.path, target.format)?;
        log::info!("Wrote {} ({})", target.path.display(), target.format);
    }
    Ok(())
}

/// Person rows for males with more than two deaths.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn count_male_fatalities(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<u64, AnalysisError> {
    let people = CrashTables::table(TableName::PrimaryPerson);
    let males = format!("SELECT * FROM {people} WHERE PRSN_GNDR_ID = 'MALE' AND DEATH_CNT > 2");

    persist(tables, &males, output)?;
    Ok(count_rows(tables.connection(), &males)?)
}

/// Units whose body style mentions `MOTORCYCLE`.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn count_two_wheeler_crashes(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<u64, AnalysisError> {
    let units = CrashTables::table(TableName::Units);
    let two_wheelers =
        format!("SELECT * FROM {units} WHERE contains(VEH_BODY_STYL_ID, 'MOTORCYCLE')");

    persist(tables, &two_wheelers, output)?;
    Ok(count_rows(tables.connection(), &two_wheelers)?)
}

/// Top 5 makes among crashes where someone was killed and the airbag did
/// not deploy.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn top_makes_fatal_without_airbags(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Vec<String>, AnalysisError> {
    let fatal = format!(
        "SELECT u.VEH_MAKE_ID \
         FROM {units} AS u JOIN {people} AS p USING ({CRASH_ID}) \
         WHERE p.PRSN_INJRY_SEV_ID = 'KILLED' \
           AND p.PRSN_AIRBAG_ID = 'NOT DEPLOYED' \
           AND u.VEH_MAKE_ID <> {na}",
        units = CrashTables::table(TableName::Units),
        people = CrashTables::table(TableName::PrimaryPerson),
        na = sql::literal(NA),
    );
    let top = top_by_count(&fatal, &["VEH_MAKE_ID"], TOP_MAKES);

    persist(tables, &top, output)?;
    Ok(labels(tables.connection(), &top)?
        .into_iter()
        .flatten()
        .collect())
}

/// Hit-and-run vehicle rows joined to a validly licensed driver.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn count_hit_and_run_with_valid_license(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<u64, AnalysisError> {
    let hit_and_run = format!(
        "SELECT {CRASH_ID}, u.VEH_HNR_FL, p.DRVR_LIC_TYPE_ID \
         FROM (SELECT {CRASH_ID}, VEH_HNR_FL FROM {units}) AS u \
         JOIN (SELECT {CRASH_ID}, DRVR_LIC_TYPE_ID FROM {people}) AS p USING ({CRASH_ID}) \
         WHERE u.VEH_HNR_FL = 'Y' AND p.DRVR_LIC_TYPE_ID IN {licenses}",
        units = CrashTables::table(TableName::Units),
        people = CrashTables::table(TableName::PrimaryPerson),
        licenses = sql::literal_list(VALID_LICENSE_TYPES),
    );

    persist(tables, &hit_and_run, output)?;
    Ok(count_rows(tables.connection(), &hit_and_run)?)
}

/// Driver license state with the most person rows not marked female.
///
/// The full ranking is written. The returned state is `None` when the
/// top-ranked group is the null state.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyResult`] if no rows qualify, or another
/// [`AnalysisError`] if a column is missing or the write fails.
pub fn state_with_most_non_female_crashes(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Option<String>, AnalysisError> {
    let non_female = format!(
        "SELECT DRVR_LIC_STATE_ID FROM {} WHERE PRSN_GNDR_ID <> 'FEMALE'",
        CrashTables::table(TableName::PrimaryPerson),
    );
    let ranked = rank_by_count(&non_female, &["DRVR_LIC_STATE_ID"]);

    persist(tables, &ranked, output)?;
    labels(tables.connection(), &ranked)?
        .into_iter()
        .next()
        .ok_or(AnalysisError::EmptyResult(QueryId::StateWithoutFemales))
}

/// Makes ranked 3rd through 5th by total casualties (injuries plus
/// deaths) across their units.
///
/// A unit with a null injury or death count contributes nothing to its
/// make's total.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn casualty_makes_ranked_third_to_fifth(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Vec<String>, AnalysisError> {
    let casualties = format!(
        "SELECT VEH_MAKE_ID, TOT_INJRY_CNT + DEATH_CNT AS {total} \
         FROM {units} WHERE VEH_MAKE_ID <> {na}",
        total = sql::ident(TOT_CASUALTIES_CNT),
        units = CrashTables::table(TableName::Units),
        na = sql::literal(NA),
    );
    let third_to_fifth = format!(
        "SELECT VEH_MAKE_ID, SUM({total}) AS {agg} FROM ({casualties}) \
         GROUP BY ALL ORDER BY {agg} DESC NULLS LAST LIMIT {limit} OFFSET {skip}",
        total = sql::ident(TOT_CASUALTIES_CNT),
        agg = sql::ident(TOT_CASUALTIES_CNT_AGG),
        limit = TOP_MAKES - CASUALTY_RANKS_SKIPPED,
        skip = CASUALTY_RANKS_SKIPPED,
    );

    persist(tables, &third_to_fifth, output)?;
    Ok(labels(tables.connection(), &third_to_fifth)?
        .into_iter()
        .flatten()
        .collect())
}

/// Most frequent ethnicity for each body style, ignoring uninformative
/// body styles and ethnicities.
///
/// Counts are grouped per (body style, ethnicity) first, then ranked
/// within each body style; only rank 1 is kept. The mapping is ordered by
/// body style.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn top_ethnicity_by_body_style(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Vec<BodyStyleEthnicity>, AnalysisError> {
    let informative = format!(
        "SELECT u.VEH_BODY_STYL_ID, p.PRSN_ETHNICITY_ID \
         FROM {units} AS u JOIN {people} AS p USING ({CRASH_ID}) \
         WHERE u.VEH_BODY_STYL_ID NOT IN {body_styles} \
           AND p.PRSN_ETHNICITY_ID NOT IN {ethnicities}",
        units = CrashTables::table(TableName::Units),
        people = CrashTables::table(TableName::PrimaryPerson),
        body_styles = sql::literal_list(UNINFORMATIVE_BODY_STYLES),
        ethnicities = sql::literal_list(UNINFORMATIVE_ETHNICITIES),
    );
    let grouped = count_by(&informative, &["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID"]);
    let top = top_within_groups(
        &grouped,
        "VEH_BODY_STYL_ID",
        COUNT_COLUMN,
        1,
        &["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID"],
    );

    persist(tables, &top, output)?;
    Ok(text_rows::<2>(tables.connection(), &top)?
        .into_iter()
        .filter_map(|[body_style, ethnicity]| {
            Some(BodyStyleEthnicity {
                body_style: body_style?,
                ethnicity: ethnicity?,
            })
        })
        .collect())
}

/// Top 5 driver zip codes among crashes with alcohol as a contributing
/// factor.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn top_zip_codes_alcohol_crashes(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Vec<String>, AnalysisError> {
    let alcohol = format!(
        "SELECT p.DRVR_ZIP \
         FROM {units} AS u JOIN {people} AS p USING ({CRASH_ID}) \
         WHERE p.DRVR_ZIP IS NOT NULL \
           AND (contains(u.CONTRIB_FACTR_1_ID, 'ALCOHOL') \
             OR contains(u.CONTRIB_FACTR_2_ID, 'ALCOHOL'))",
        units = CrashTables::table(TableName::Units),
        people = CrashTables::table(TableName::PrimaryPerson),
    );
    let top = top_by_count(&alcohol, &["DRVR_ZIP"], TOP_ZIP_CODES);

    persist(tables, &top, output)?;
    Ok(labels(tables.connection(), &top)?
        .into_iter()
        .flatten()
        .collect())
}

/// `column` is above [`DAMAGE_SCALE_THRESHOLD`] and not one of the
/// [`INVALID_DAMAGE_SCALES`].
fn severe_damage(column: &str) -> String {
    format!(
        "({column} > {threshold} AND {column} NOT IN {invalid})",
        threshold = sql::literal(DAMAGE_SCALE_THRESHOLD),
        invalid = sql::literal_list(INVALID_DAMAGE_SCALES),
    )
}

/// Distinct insured crashes where a unit's damage scale is above
/// `DAMAGED 4` but no property was damaged.
///
/// The damage scale comparison is lexicographic.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn count_undamaged_property_crashes(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<u64, AnalysisError> {
    let qualifying = format!(
        "SELECT * FROM {damages} AS d JOIN {units} AS u USING ({CRASH_ID}) \
         WHERE ({scale_1} OR {scale_2}) \
           AND d.DAMAGED_PROPERTY = 'NONE' \
           AND u.FIN_RESP_TYPE_ID = {insured}",
        damages = CrashTables::table(TableName::Damages),
        units = CrashTables::table(TableName::Units),
        scale_1 = severe_damage("u.VEH_DMAG_SCL_1_ID"),
        scale_2 = severe_damage("u.VEH_DMAG_SCL_2_ID"),
        insured = sql::literal(LIABILITY_INSURANCE),
    );

    persist(tables, &qualifying, output)?;
    Ok(count_distinct(tables.connection(), &qualifying, CRASH_ID)?)
}

/// Top 5 makes for speeding charges with licensed drivers, restricted to
/// the 10 most common vehicle colors and 25 most common license states.
///
/// The state ranking only considers units whose license state does not
/// cast to an integer (see [`sql::casts_to_int`]). A null state fails the
/// cast too and can rank, but never matches a unit. The returned makes may
/// include null.
///
/// # Errors
///
/// Returns [`AnalysisError`] if a column is missing or the write fails.
pub fn top_makes_speeding_offenses(
    tables: &CrashTables,
    output: Option<&OutputTarget>,
) -> Result<Vec<Option<String>>, AnalysisError> {
    let units = CrashTables::table(TableName::Units);

    let top_states = top_by_count(
        &format!(
            "SELECT VEH_LIC_STATE_ID FROM {units} WHERE NOT {}",
            sql::casts_to_int("VEH_LIC_STATE_ID")
        ),
        &["VEH_LIC_STATE_ID"],
        TOP_LICENSE_STATES,
    );
    let top_colors = top_by_count(
        &format!(
            "SELECT VEH_COLOR_ID FROM {units} WHERE VEH_COLOR_ID <> {}",
            sql::literal(NA)
        ),
        &["VEH_COLOR_ID"],
        TOP_COLORS,
    );
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Top license states: {:?}; top colors: {:?}",
            labels(tables.connection(), &top_states)?,
            labels(tables.connection(), &top_colors)?
        );
    }

    let speeding = format!(
        "SELECT u.VEH_MAKE_ID \
         FROM {charges} AS c \
         JOIN {people} AS p USING ({CRASH_ID}) \
         JOIN {units} AS u USING ({CRASH_ID}) \
         WHERE contains(c.CHARGE, 'SPEED') \
           AND p.DRVR_LIC_TYPE_ID IN {licenses} \
           AND u.VEH_COLOR_ID IN (SELECT VEH_COLOR_ID FROM ({top_colors})) \
           AND u.VEH_LIC_STATE_ID IN (SELECT VEH_LIC_STATE_ID FROM ({top_states}))",
        charges = CrashTables::table(TableName::Charges),
        people = CrashTables::table(TableName::PrimaryPerson),
        licenses = sql::literal_list(VALID_LICENSE_TYPES),
    );
    let top = top_by_count(&speeding, &["VEH_MAKE_ID"], TOP_MAKES);

    persist(tables, &top, output)?;
    Ok(labels(tables.connection(), &top)?)
}

/// Runs one query and wraps its answer as a [`QueryOutcome`].
///
/// # Errors
///
/// Returns the query's [`AnalysisError`].
pub fn run_query(
    tables: &CrashTables,
    query: QueryId,
    output: Option<&OutputTarget>,
) -> Result<QueryOutcome, AnalysisError> {
    let ranked = |names: Vec<String>| QueryOutcome::Ranked(names.into_iter().map(Some).collect());

    Ok(match query {
        QueryId::MaleFatalities => QueryOutcome::Count(count_male_fatalities(tables, output)?),
        QueryId::TwoWheelerCrashes => {
            QueryOutcome::Count(count_two_wheeler_crashes(tables, output)?)
        }
        QueryId::FatalNoAirbagMakes => ranked(top_makes_fatal_without_airbags(tables, output)?),
        QueryId::HitAndRunLicensed => {
            QueryOutcome::Count(count_hit_and_run_with_valid_license(tables, output)?)
        }
        QueryId::StateWithoutFemales => {
            QueryOutcome::Label(state_with_most_non_female_crashes(tables, output)?)
        }
        QueryId::CasualtyMakes => ranked(casualty_makes_ranked_third_to_fifth(tables, output)?),
        QueryId::EthnicityByBodyStyle => {
            QueryOutcome::Mapping(top_ethnicity_by_body_style(tables, output)?)
        }
        QueryId::AlcoholZipCodes => ranked(top_zip_codes_alcohol_crashes(tables, output)?),
        QueryId::UndamagedPropertyCrashes => {
            QueryOutcome::Count(count_undamaged_property_crashes(tables, output)?)
        }
        QueryId::SpeedingMakes => {
            QueryOutcome::Ranked(top_makes_speeding_offenses(tables, output)?)
        }
    })
}
