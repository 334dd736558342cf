//! Next-season forecasts: one independent imputed regression per statistic

pub mod evaluate;

pub use evaluate::{evaluate_models, Evaluation, EvaluationSettings, ModelMetrics};

use crate::error::{ProjectionError, Result};
use crate::frame::{float_values, has_column, int_values, require_column, select_existing};
use crate::regression::ImputedRegression;
use crate::stats::{
    pred_column, ForecastTarget, RatioStat, AGE, FEATURE_POOL, FORECAST_TARGETS, PLAYER,
    PREDICTED_SEASON, SEASON, THREE_POINT_PCT,
};
use polars::prelude::*;
use rayon::prelude::*;
use std::fmt;

/// Why a statistic produced no prediction column
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingColumn(String),
    NoUsableFeatures,
    Fit(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumn(col) => write!(f, "missing '{}'", col),
            SkipReason::NoUsableFeatures => write!(f, "no usable features"),
            SkipReason::Fit(msg) => write!(f, "fit failed: {}", msg),
        }
    }
}

/// Result of forecasting a single statistic
#[derive(Debug, Clone, PartialEq)]
pub enum StatOutcome {
    Predicted {
        target: ForecastTarget,
        features: Vec<String>,
        training_rows: usize,
        values: Vec<f64>,
    },
    Skipped {
        target: ForecastTarget,
        reason: SkipReason,
    },
}

impl StatOutcome {
    pub fn target(&self) -> ForecastTarget {
        match self {
            StatOutcome::Predicted { target, .. } | StatOutcome::Skipped { target, .. } => *target,
        }
    }
}

/// Forecast for the season after the latest one in the history
#[derive(Debug, Clone)]
pub struct Forecast {
    pub latest_season: i32,
    pub predicted_season: i32,
    /// `Player`, `Age`, `predicted_season` and one `<stat>_pred` column per fitted stat
    pub table: DataFrame,
    pub outcomes: Vec<StatOutcome>,
}

impl Forecast {
    pub fn prediction_columns(&self) -> Vec<String> {
        self.table
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .filter(|c| c.ends_with("_pred"))
            .collect()
    }
}

/// Most recent season present in the table
pub fn latest_season(history: &DataFrame) -> Result<i32> {
    int_values(history, SEASON)?
        .into_iter()
        .flatten()
        .max()
        .map(|s| s as i32)
        .ok_or_else(|| ProjectionError::EmptyTable("no season values in history".to_string()))
}

/// Rows of the given season, in original order
pub fn season_rows(history: &DataFrame, season: i32) -> Result<DataFrame> {
    require_column(history, SEASON)?;
    Ok(history
        .clone()
        .lazy()
        .filter(col(SEASON).cast(DataType::Float64).eq(lit(season as f64)))
        .collect()?)
}

/// Feature matrix rows; a feature the frame lacks is missing everywhere
fn feature_matrix(df: &DataFrame, features: &[String]) -> Result<Vec<Vec<Option<f64>>>> {
    let columns = features
        .iter()
        .map(|f| {
            if has_column(df, f) {
                float_values(df, f)
            } else {
                Ok(vec![None; df.height()])
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((0..df.height())
        .map(|r| columns.iter().map(|c| c[r]).collect())
        .collect())
}

/// Fit one statistic on every history row where it is known and predict it
/// for each inference row. Features are the pool columns with at least one
/// observed training value; gaps are median-imputed.
pub fn forecast_stat(history: &DataFrame, inference: &DataFrame, target: ForecastTarget, pool: &[&str]) -> StatOutcome {
    let skipped = |reason| StatOutcome::Skipped { target, reason };

    let Ok(y) = float_values(history, target.column) else {
        return skipped(SkipReason::MissingColumn(target.column.to_string()));
    };
    let train: Vec<usize> = (0..y.len()).filter(|&r| y[r].is_some()).collect();

    let features: Vec<String> = pool
        .iter()
        .filter(|name| {
            float_values(history, name)
                .map(|values| train.iter().any(|&r| values[r].is_some()))
                .unwrap_or(false)
        })
        .map(|name| name.to_string())
        .collect();

    if features.is_empty() {
        return skipped(SkipReason::NoUsableFeatures);
    }

    let fitted = feature_matrix(history, &features).and_then(|x| {
        let x_train: Vec<Vec<Option<f64>>> = train.iter().map(|&r| x[r].clone()).collect();
        let y_train: Vec<f64> = train.iter().filter_map(|&r| y[r]).collect();
        ImputedRegression::fit(&x_train, &y_train, features.len())
    });
    let model = match fitted {
        Ok(model) => model,
        Err(e) => return skipped(SkipReason::Fit(e.to_string())),
    };

    // Inference rows may lack a feature column entirely; impute it.
    let values = match feature_matrix(inference, &features) {
        Ok(rows) => rows.iter().map(|x| model.predict(x)).collect(),
        Err(e) => return skipped(SkipReason::Fit(e.to_string())),
    };

    StatOutcome::Predicted {
        target,
        features,
        training_rows: train.len(),
        values,
    }
}

/// Made/attempted ratio from predicted components. Both sides are clipped
/// at zero, a non-positive denominator yields 0, and the ratio is clipped
/// to [0, 1].
pub fn derive_ratio(makes: &[f64], attempts: &[f64]) -> Vec<f64> {
    makes
        .iter()
        .zip(attempts)
        .map(|(&m, &a)| {
            let m = m.max(0.0);
            let a = a.max(0.0);
            if a > 0.0 {
                (m / a).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Clip both predicted components to be non-negative and add the ratio column
fn add_ratio_column(table: &mut DataFrame, ratio: RatioStat) -> Result<bool> {
    let makes_col = pred_column(ratio.makes);
    let attempts_col = pred_column(ratio.attempts);
    if !has_column(table, &makes_col) || !has_column(table, &attempts_col) {
        return Ok(false);
    }

    let clip = |values: Vec<Option<f64>>| -> Vec<f64> {
        values.into_iter().map(|v| v.unwrap_or(0.0).max(0.0)).collect()
    };
    let makes = clip(float_values(table, &makes_col)?);
    let attempts = clip(float_values(table, &attempts_col)?);
    let values = derive_ratio(&makes, &attempts);

    table.with_column(Column::new(makes_col.into(), makes))?;
    table.with_column(Column::new(attempts_col.into(), attempts))?;
    table.with_column(Column::new(pred_column(ratio.name).into(), values))?;
    Ok(true)
}

/// Forecast every target statistic for the season after the latest one
pub fn forecast_next_season(history: &DataFrame) -> Result<Forecast> {
    forecast_with(history, &FORECAST_TARGETS, &FEATURE_POOL)
}

pub fn forecast_with(history: &DataFrame, targets: &[ForecastTarget], pool: &[&str]) -> Result<Forecast> {
    let latest = latest_season(history)?;
    let predicted_season = latest + 1;
    let inference = season_rows(history, latest)?;

    log::info!(
        "Using season {} ({} rows) to predict season {}",
        latest,
        inference.height(),
        predicted_season
    );

    let mut table = select_existing(&inference, &[PLAYER, AGE])?;
    let height = table.height();
    table.with_column(Column::new(
        PREDICTED_SEASON.into(),
        vec![predicted_season as i64; height],
    ))?;

    let outcomes: Vec<StatOutcome> = targets
        .par_iter()
        .map(|&target| forecast_stat(history, &inference, target, pool))
        .collect();

    for outcome in &outcomes {
        match outcome {
            StatOutcome::Predicted {
                target,
                features,
                values,
                ..
            } => {
                log::info!(
                    "{}: predicted for {} rows using {} features",
                    target.name,
                    values.len(),
                    features.len()
                );
                table.with_column(Column::new(pred_column(target.name).into(), values.clone()))?;
            }
            StatOutcome::Skipped { target, reason } => {
                log::warn!("Skipping {}: {}", target.name, reason);
            }
        }
    }

    if add_ratio_column(&mut table, THREE_POINT_PCT)? {
        log::info!(
            "{} derived from {} / {}",
            pred_column(THREE_POINT_PCT.name),
            pred_column(THREE_POINT_PCT.makes),
            pred_column(THREE_POINT_PCT.attempts)
        );
    }

    Ok(Forecast {
        latest_season: latest,
        predicted_season,
        table,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> DataFrame {
        df!(
            PLAYER => ["A", "A", "B", "B", "C", "C"],
            SEASON => [2020i64, 2021, 2020, 2021, 2020, 2021],
            AGE => [24.0, 25.0, 30.0, 31.0, 22.0, 23.0],
            "MP" => [30.0, 32.0, 20.0, 18.0, 10.0, 25.0],
            "PTS" => [10.0, 15.0, 8.0, 6.0, 4.0, 12.0],
            "3P" => [1.0, 1.5, 0.0, 0.0, 0.5, 2.0],
            "3PA" => [3.0, 4.0, 0.0, 0.0, 1.5, 5.0]
        )
        .unwrap()
    }

    #[test]
    fn test_latest_season() {
        assert_eq!(latest_season(&history()).unwrap(), 2021);
        let no_season = df!(PLAYER => ["A"]).unwrap();
        assert!(latest_season(&no_season).is_err());
        let empty_season = df!(PLAYER => ["A"], SEASON => [None::<i64>]).unwrap();
        assert!(latest_season(&empty_season).is_err());
    }

    #[test]
    fn test_derive_ratio_bounds() {
        let ratio = derive_ratio(&[1.0, 2.0, -1.0, 3.0, 0.5], &[4.0, 0.0, 2.0, 1.0, -2.0]);
        assert_eq!(ratio, vec![0.25, 0.0, 0.0, 1.0, 0.0]);
        assert!(ratio.iter().all(|r| (0.0..=1.0).contains(r)));
    }

    #[test]
    fn test_forecast_one_row_per_latest_player() {
        let forecast = forecast_next_season(&history()).unwrap();
        assert_eq!(forecast.latest_season, 2021);
        assert_eq!(forecast.predicted_season, 2022);
        assert_eq!(forecast.table.height(), 3);
        assert_eq!(int_values(&forecast.table, PREDICTED_SEASON).unwrap()[0], Some(2022));
        assert_eq!(float_values(&forecast.table, AGE).unwrap()[0], Some(25.0));
        assert!(has_column(&forecast.table, "PTS_pred"));
        assert!(has_column(&forecast.table, "3PM_pred"));
        assert!(has_column(&forecast.table, "3P%_pred"));
    }

    #[test]
    fn test_missing_stat_is_skipped_not_fatal() {
        let forecast = forecast_next_season(&history()).unwrap();
        let skipped: Vec<&str> = forecast
            .outcomes
            .iter()
            .filter(|o| matches!(o, StatOutcome::Skipped { .. }))
            .map(|o| o.target().name)
            .collect();
        assert_eq!(skipped, vec!["TRB", "AST", "STL", "BLK", "FG%", "FT%"]);
        assert!(!has_column(&forecast.table, "TRB_pred"));
    }

    #[test]
    fn test_no_usable_features() {
        let table = df!(PLAYER => ["A"], SEASON => [2021i64], "PTS" => [10.0]).unwrap();
        let target = ForecastTarget { name: "PTS", column: "PTS" };
        let outcome = forecast_stat(&table, &table, target, &["MP", "G"]);
        assert_eq!(
            outcome,
            StatOutcome::Skipped {
                target,
                reason: SkipReason::NoUsableFeatures
            }
        );
    }

    #[test]
    fn test_prediction_exists_when_features_missing() {
        // latest-season player with no minutes or age
        let extra = df!(
            PLAYER => ["D"],
            SEASON => [2021i64],
            AGE => [None::<f64>],
            "MP" => [None::<f64>],
            "PTS" => [Some(5.0)],
            "3P" => [None::<f64>],
            "3PA" => [None::<f64>]
        )
        .unwrap();
        let history = history().vstack(&extra).unwrap();

        let forecast = forecast_next_season(&history).unwrap();
        let pts = float_values(&forecast.table, "PTS_pred").unwrap();
        assert_eq!(pts.len(), 4);
        assert!(pts.iter().all(|v| v.is_some()));
    }

    #[test]
    fn test_ratio_column_clipped() {
        let forecast = forecast_next_season(&history()).unwrap();
        let ratio = float_values(&forecast.table, "3P%_pred").unwrap();
        assert!(ratio.iter().all(|r| matches!(r, Some(v) if (0.0..=1.0).contains(v))));
        let makes = float_values(&forecast.table, "3PM_pred").unwrap();
        assert!(makes.iter().all(|m| m.unwrap() >= 0.0));
    }

    #[test]
    fn test_forecast_deterministic() {
        let a = forecast_next_season(&history()).unwrap();
        let b = forecast_next_season(&history()).unwrap();
        assert!(a.table.equals_missing(&b.table));
    }
}
