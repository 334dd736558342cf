//! Next-season target columns for supervised training

use crate::error::{ProjectionError, Result};
use crate::frame::has_column;
use crate::stats::{next_column, PLAYER, SEASON};
use polars::prelude::*;

/// Stable sort by player name, then season ascending (missing seasons last)
pub fn sort_by_player_season(df: DataFrame) -> Result<DataFrame> {
    for name in [PLAYER, SEASON] {
        if !has_column(&df, name) {
            return Err(ProjectionError::MissingColumn(name.to_string()));
        }
    }

    let options = SortMultipleOptions::default()
        .with_maintain_order(true)
        .with_nulls_last(true);
    Ok(df.lazy().sort([PLAYER, SEASON], options).collect()?)
}

/// Sort the merged table, add one `<stat>_next` column per target present
/// and drop each player's final season (rows where every target is null).
/// The next value comes from the player's next listed season, gaps included.
/// Targets missing from the table are skipped with a warning.
pub fn build_modeling_table(merged: DataFrame, targets: &[&str]) -> Result<DataFrame> {
    let sorted = sort_by_player_season(merged)?;

    let mut present = Vec::new();
    for stat in targets {
        if has_column(&sorted, stat) {
            present.push(*stat);
        } else {
            log::warn!("Skipping target {}: column not present", stat);
        }
    }

    if present.is_empty() {
        log::warn!("No target columns present; modeling table keeps every row");
        return Ok(sorted);
    }

    let shifted: Vec<Expr> = present
        .iter()
        .map(|stat| {
            col(*stat)
                .cast(DataType::Float64)
                .shift(lit(-1))
                .over([col(PLAYER)])
                .alias(next_column(stat))
        })
        .collect();

    let any_next = present
        .iter()
        .map(|stat| col(next_column(stat)).is_not_null())
        .reduce(|a, b| a.or(b))
        .unwrap_or_else(|| lit(true));

    let before = sorted.height();
    let table = sorted.lazy().with_columns(shifted).filter(any_next).collect()?;
    log::info!(
        "Modeling table: {} of {} rows have a following season",
        table.height(),
        before
    );

    Ok(table)
}
