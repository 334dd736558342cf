//! Left join of per-game and advanced season tables

use crate::error::{ProjectionError, Result};
use crate::frame::{coerce_numeric_except, has_column};
use crate::stats::{ADVANCED_SUFFIX, IDENTITY_COLUMNS, PLAYER, SEASON};
use polars::prelude::*;

const ROW_ORDER: &str = "__row_order";

fn require_keys(df: &DataFrame, keys: &[&str], side: &str) -> Result<()> {
    match keys.iter().find(|key| !has_column(df, key)) {
        Some(key) => Err(ProjectionError::MissingColumn(format!(
            "{} (join key, {} table)",
            key, side
        ))),
        None => Ok(()),
    }
}

/// Left outer join in left-row order. Every left row survives; it is
/// repeated once per matching right row and null-padded when nothing
/// matches. Right columns whose names clash with a left column get
/// `suffix` appended.
pub fn left_join(left: DataFrame, right: DataFrame, keys: &[&str], suffix: &str) -> Result<DataFrame> {
    require_keys(&left, keys, "left")?;
    require_keys(&right, keys, "right")?;

    let on: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
    let args = JoinArgs::new(JoinType::Left).with_suffix(Some(suffix.into()));

    let joined = left
        .lazy()
        .with_row_index(ROW_ORDER, None)
        .join(right.lazy(), on.clone(), on, args)
        .sort([ROW_ORDER], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    Ok(joined.drop(ROW_ORDER)?)
}

/// Join per-game onto advanced stats by (player, season) and coerce every
/// non-identity column to numbers. Players without an advanced row keep
/// their per-game values with null advanced columns.
pub fn merge_seasons(per_game: DataFrame, advanced: DataFrame) -> Result<DataFrame> {
    let rows = per_game.height();
    let merged = left_join(per_game, advanced, &[PLAYER, SEASON], ADVANCED_SUFFIX)?;
    if merged.height() != rows {
        log::warn!(
            "{} per-game rows became {} after the join; advanced keys are not unique",
            rows,
            merged.height()
        );
    }
    coerce_numeric_except(merged, &IDENTITY_COLUMNS)
}
