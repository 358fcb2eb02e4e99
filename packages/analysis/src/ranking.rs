//! Frequency ranking and per-group ranking, as SQL over a source query.
//!
//! Rankings only order by the aggregate. No secondary key is applied, so
//! the relative order of tied groups is whatever `DuckDB`'s sort produces
//! and must not be relied upon.

use crash_analysis_database::sql;

/// Name of the per-group row count produced by [`count_by`].
pub const COUNT_COLUMN: &str = "count";

/// Groups the rows of `source` by `keys` and counts them.
///
/// Output columns are `keys` followed by [`COUNT_COLUMN`].
#[must_use]
pub fn count_by(source: &str, keys: &[&str]) -> String {
    let keys: Vec<String> = keys.iter().map(|k| sql::ident(k)).collect();
    format!(
        "SELECT {}, COUNT(*) AS {} FROM ({source}) GROUP BY ALL",
        keys.join(", "),
        sql::ident(COUNT_COLUMN),
    )
}

/// Groups by `keys` and orders groups by count, most frequent first.
#[must_use]
pub fn rank_by_count(source: &str, keys: &[&str]) -> String {
    format!(
        "{} ORDER BY {} DESC",
        count_by(source, keys),
        sql::ident(COUNT_COLUMN)
    )
}

/// Groups by `keys`, counts rows, and keeps the `n` most frequent groups.
#[must_use]
pub fn top_by_count(source: &str, keys: &[&str], n: usize) -> String {
    format!("{} LIMIT {n}", rank_by_count(source, keys))
}

/// Keeps the top `keep` rows of each `partition` group of `grouped` when
/// ordered by `order_by` descending (nulls last), projecting `columns`.
///
/// Output rows are ordered by `partition`.
#[must_use]
pub fn top_within_groups(
    grouped: &str,
    partition: &str,
    order_by: &str,
    keep: usize,
    columns: &[&str],
) -> String {
    let partition = sql::ident(partition);
    let columns: Vec<String> = columns.iter().map(|c| sql::ident(c)).collect();
    format!(
        "WITH grouped AS ({grouped}), \
         ranked AS (\
           SELECT *, row_number() OVER (\
             PARTITION BY {partition} ORDER BY {} DESC NULLS LAST\
           ) AS group_rank FROM grouped\
         ) \
         SELECT {} FROM ranked WHERE group_rank <= {keep} ORDER BY {partition}",
        sql::ident(order_by),
        columns.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use crash_analysis_database::extract::{labels, text_rows};
    use crash_analysis_database::open_in_memory;

    use super::*;

    const MAKES: &str = "SELECT * FROM (VALUES \
        ('FORD'), ('KIA'), ('FORD'), ('AUDI'), ('FORD'), ('KIA'), (NULL)\
        ) AS t(VEH_MAKE_ID)";

    #[test]
    fn ranks_groups_by_count() {
        let conn = open_in_memory().unwrap();
        let ranked: Vec<[Option<String>; 2]> =
            text_rows(&conn, &top_by_count(MAKES, &["VEH_MAKE_ID"], 2)).unwrap();
        assert_eq!(
            ranked,
            vec![
                [Some("FORD".to_owned()), Some("3".to_owned())],
                [Some("KIA".to_owned()), Some("2".to_owned())],
            ]
        );
    }

    #[test]
    fn null_keys_form_their_own_group() {
        let conn = open_in_memory().unwrap();
        let groups = labels(&conn, &rank_by_count(MAKES, &["VEH_MAKE_ID"])).unwrap();
        assert_eq!(groups.len(), 4);
        assert!(groups.contains(&None));
    }

    #[test]
    fn keeps_the_top_row_per_group() {
        let conn = open_in_memory().unwrap();
        let rows = "SELECT * FROM (VALUES \
            ('SUV', 'WHITE'), ('SUV', 'HISPANIC'), ('SUV', 'WHITE'), \
            ('PICKUP', 'BLACK'), ('PICKUP', 'ASIAN'), ('PICKUP', 'BLACK'), ('PICKUP', 'BLACK')\
            ) AS t(VEH_BODY_STYL_ID, PRSN_ETHNICITY_ID)";
        let grouped = count_by(rows, &["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID"]);
        let top: Vec<[Option<String>; 3]> = text_rows(
            &conn,
            &top_within_groups(
                &grouped,
                "VEH_BODY_STYL_ID",
                COUNT_COLUMN,
                1,
                &["VEH_BODY_STYL_ID", "PRSN_ETHNICITY_ID", COUNT_COLUMN],
            ),
        )
        .unwrap();
        assert_eq!(
            top,
            vec![
                [
                    Some("PICKUP".to_owned()),
                    Some("BLACK".to_owned()),
                    Some("3".to_owned())
                ],
                [
                    Some("SUV".to_owned()),
                    Some("WHITE".to_owned()),
                    Some("2".to_owned())
                ],
            ]
        );
    }
}
