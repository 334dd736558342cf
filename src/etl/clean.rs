//! Per-season cleaning of scraped tables

use crate::error::Result;
use crate::frame::{has_column, text_values, RawTable};
use crate::stats::{AGGREGATE_TEAM, RANK, SEASON, TEAM, TEAM_ALIAS};
use polars::prelude::*;

lazy_static::lazy_static! {
    // Newer pages mark a traded player's total row as 2TM, 3TM, ...
    static ref MULTI_TEAM_MARKER: regex::Regex = regex::Regex::new(r"^\d+TM$").unwrap();
}

/// Collapse nested header levels to one label per column: the innermost
/// level wins, even when blank (it then becomes `Unnamed: <i>`).
pub fn flatten_headers(levels: &[Vec<String>], width: usize) -> Vec<String> {
    let innermost = levels.last();
    (0..width)
        .map(|col| {
            innermost
                .and_then(|level| level.get(col))
                .map(|label| label.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Flatten headers into a text frame, dropping repeated header rows and
/// fully empty rows
pub fn normalize_raw(raw: &RawTable) -> Result<DataFrame> {
    let headers = flatten_headers(&raw.header_levels, raw.width());
    let df = raw.to_frame(&headers)?;

    let mut lf = df.clone().lazy();
    if has_column(&df, RANK) {
        lf = lf.filter(col(RANK).neq_missing(lit(RANK)));
    }
    let any_value = df
        .get_column_names()
        .iter()
        .map(|name| col(name.to_string()).is_not_null())
        .reduce(|a, b| a.or(b));
    if let Some(any_value) = any_value {
        lf = lf.filter(any_value);
    }

    Ok(lf.collect()?)
}

/// Clean one season's raw table and tag every row with its season year
pub fn clean_season(raw: &RawTable, year: i32) -> Result<DataFrame> {
    let mut df = normalize_raw(raw)?;

    if !has_column(&df, TEAM) && has_column(&df, TEAM_ALIAS) {
        df.rename(TEAM_ALIAS, TEAM.into())?;
    }

    if has_column(&df, TEAM) {
        let teams: Vec<Option<String>> = text_values(&df, TEAM)?
            .into_iter()
            .map(|team| match team {
                Some(code) if MULTI_TEAM_MARKER.is_match(&code) => Some(AGGREGATE_TEAM.to_string()),
                other => other,
            })
            .collect();
        df.with_column(Column::new(TEAM.into(), teams))?;
    }

    let height = df.height();
    df.with_column(Column::new(SEASON.into(), vec![year as i64; height]))?;

    log::debug!(
        "Season {}: {} rows, {} columns after cleaning",
        year,
        df.height(),
        df.width()
    );
    Ok(df)
}
