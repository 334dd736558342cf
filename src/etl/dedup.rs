//! Collapse traded players' per-team rows onto their season-total row

use crate::error::Result;
use crate::frame::has_column;
use crate::stats::{AGGREGATE_TEAM, PLAYER, SEASON, TEAM};
use polars::prelude::*;

/// For every (player, season) group containing a `TOT` row keep only that
/// row; other groups are left untouched. Frames without the player, team
/// or season column are returned unchanged.
pub fn keep_aggregate_rows(df: DataFrame) -> Result<DataFrame> {
    if ![PLAYER, TEAM, SEASON].iter().all(|name| has_column(&df, name)) {
        log::debug!("No player/team/season columns, skipping aggregate-row filter");
        return Ok(df);
    }

    let is_total = col(TEAM).eq(lit(AGGREGATE_TEAM)).fill_null(lit(false));
    let group_has_total = is_total
        .clone()
        .any(true)
        .over([col(PLAYER), col(SEASON)]);

    let before = df.height();
    let out = df
        .lazy()
        .filter(is_total.or(group_has_total.not()))
        .collect()?;

    log::info!(
        "Dropped {} per-team rows of traded players",
        before - out.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{float_values, int_values, text_values};

    fn frame(rows: &[(&str, i64, &str, f64)]) -> DataFrame {
        df!(
            PLAYER => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            TEAM => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            "PTS" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
            SEASON => rows.iter().map(|r| r.1).collect::<Vec<_>>()
        )
        .unwrap()
    }

    #[test]
    fn test_keeps_only_total_row() {
        let input = frame(&[
            ("A", 2020, "X", 10.0),
            ("A", 2021, "TOT", 15.0),
            ("A", 2021, "Y", 6.0),
            ("A", 2021, "Z", 9.0),
            ("B", 2021, "Y", 4.0),
        ]);

        let out = keep_aggregate_rows(input).unwrap();
        assert_eq!(out.height(), 3);
        assert_eq!(
            text_values(&out, TEAM).unwrap(),
            vec![Some("X".to_string()), Some("TOT".to_string()), Some("Y".to_string())]
        );
        assert_eq!(int_values(&out, SEASON).unwrap(), vec![Some(2020), Some(2021), Some(2021)]);
        assert_eq!(float_values(&out, "PTS").unwrap()[1], Some(15.0));
    }

    #[test]
    fn test_groups_without_total_unchanged() {
        let input = frame(&[("C", 2019, "X", 1.0), ("C", 2019, "Y", 2.0)]);
        let out = keep_aggregate_rows(input.clone()).unwrap();
        assert!(out.equals_missing(&input));
    }

    #[test]
    fn test_null_team_is_not_a_total() {
        let input = df!(
            PLAYER => ["A", "A"],
            TEAM => [Some("TOT"), None],
            SEASON => [2021i64, 2021]
        )
        .unwrap();
        assert_eq!(keep_aggregate_rows(input).unwrap().height(), 1);
    }

    #[test]
    fn test_idempotent() {
        let input = frame(&[
            ("A", 2021, "TOT", 15.0),
            ("A", 2021, "Y", 6.0),
            ("B", 2021, "Y", 4.0),
        ]);
        let once = keep_aggregate_rows(input).unwrap();
        let twice = keep_aggregate_rows(once.clone()).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_no_team_column_is_noop() {
        let input = df!(PLAYER => ["A", "A"], SEASON => [2021i64, 2021]).unwrap();
        let out = keep_aggregate_rows(input.clone()).unwrap();
        assert!(out.equals_missing(&input));
    }
}
