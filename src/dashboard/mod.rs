//! Actual + predicted table for reporting

pub mod xlsx;

pub use xlsx::write_dashboard_xlsx;

use crate::error::Result;
use crate::etl::{left_join, sort_by_player_season};
use crate::frame::{column_names, concat_frames, has_column, require_column, select_existing};
use crate::stats::{
    pred_column, ACTUAL, CARRIED_CONTEXT, DASHBOARD_COLUMNS, DASHBOARD_STATS, PLAYER, PREDICTED,
    PREDICTED_SEASON, PROVENANCE, SEASON,
};
use polars::prelude::*;

/// Each player's last non-null value of `column`, in season order, as a
/// `Player` + `column` frame
pub fn last_known_values(history: &DataFrame, column: &str) -> Result<DataFrame> {
    require_column(history, column)?;
    let sorted = sort_by_player_season(history.clone())?;
    Ok(sorted
        .lazy()
        .group_by_stable([col(PLAYER)])
        .agg([col(column).drop_nulls().last()])
        .collect()?)
}

/// Union of historical rows (tagged `Actual`) and forecast rows (tagged
/// `Predicted`) on the history's column set. Context columns the forecast
/// lacks are carried forward from each player's last known season.
pub fn build_dashboard(history: &DataFrame, predictions: &DataFrame) -> Result<DataFrame> {
    let actual = select_existing(history, &DASHBOARD_COLUMNS)?
        .lazy()
        .with_column(lit(ACTUAL).alias(PROVENANCE))
        .collect()?;

    require_column(predictions, PLAYER)?;
    require_column(predictions, PREDICTED_SEASON)?;

    let mut predicted = predictions.clone();
    for stat in DASHBOARD_STATS {
        let source = pred_column(stat);
        if has_column(&predicted, &source) && !has_column(&predicted, stat) {
            predicted.rename(&source, stat.into())?;
        }
    }
    let mut predicted = predicted
        .lazy()
        .with_columns([
            col(PREDICTED_SEASON).alias(SEASON),
            lit(PREDICTED).alias(PROVENANCE),
        ])
        .collect()?;

    for column in CARRIED_CONTEXT {
        if has_column(&predicted, column) || !has_column(&actual, column) {
            continue;
        }
        let last = last_known_values(&actual, column)?;
        predicted = left_join(predicted, last, &[PLAYER], "_last")?;
        log::debug!("Carried {} forward onto {} prediction rows", column, predicted.height());
    }

    let predicted = select_existing(&predicted, &column_names(&actual))?;

    log::info!(
        "Dashboard: {} actual rows, {} predicted rows",
        actual.height(),
        predicted.height()
    );
    concat_frames(vec![actual, predicted])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;
    use crate::frame::{float_values, int_values, text_values};

    fn history() -> DataFrame {
        df!(
            PLAYER => ["A", "A", "B", "B"],
            "Tm" => ["X", "X", "Y", "Y"],
            SEASON => [2021i64, 2020, 2020, 2021],
            "Age" => [25.0, 24.0, 30.0, 31.0],
            "MP" => [30.0, 28.0, 22.0, 20.0],
            "USG%" => [Some(20.0), Some(18.0), Some(17.0), None],
            "PTS" => [15.0, 10.0, 8.0, 6.0],
            "3P%" => [Some(0.4), Some(0.3), None, None]
        )
        .unwrap()
    }

    fn predictions() -> DataFrame {
        df!(
            PLAYER => ["A", "B"],
            "Age" => [25.0, 31.0],
            PREDICTED_SEASON => [2022i64, 2022],
            "PTS_pred" => [16.0, 5.5],
            "3PM_pred" => [1.2, 0.0],
            "3P%_pred" => [0.38, 0.0]
        )
        .unwrap()
    }

    #[test]
    fn test_last_known_values_skip_nulls() {
        let last = last_known_values(&history(), "USG%").unwrap();
        assert_eq!(
            text_values(&last, PLAYER).unwrap(),
            vec![Some("A".to_string()), Some("B".to_string())]
        );
        assert_eq!(float_values(&last, "USG%").unwrap(), vec![Some(20.0), Some(17.0)]);
    }

    #[test]
    fn test_dashboard_columns_and_provenance() {
        let dashboard = build_dashboard(&history(), &predictions()).unwrap();
        assert_eq!(
            column_names(&dashboard),
            vec![PLAYER, SEASON, "Age", "MP", "USG%", "PTS", "3P%", PROVENANCE]
        );
        assert_eq!(dashboard.height(), 6);

        let tags = text_values(&dashboard, PROVENANCE).unwrap();
        assert!(tags
            .iter()
            .all(|t| matches!(t.as_deref(), Some(ACTUAL) | Some(PREDICTED))));
        assert_eq!(tags.iter().filter(|t| t.as_deref() == Some(PREDICTED)).count(), 2);
    }

    #[test]
    fn test_dashboard_prediction_rows() {
        let dashboard = build_dashboard(&history(), &predictions()).unwrap();
        // rows 4 and 5 are the predictions for A and B
        assert_eq!(int_values(&dashboard, SEASON).unwrap()[4], Some(2022));
        assert_eq!(float_values(&dashboard, "PTS").unwrap()[4], Some(16.0));
        assert_eq!(float_values(&dashboard, "3P%").unwrap()[4], Some(0.38));
        // carried forward: last known minutes and usage
        let mp = float_values(&dashboard, "MP").unwrap();
        assert_eq!((mp[4], mp[5]), (Some(30.0), Some(20.0)));
        assert_eq!(float_values(&dashboard, "USG%").unwrap()[5], Some(17.0));
        // age comes from the prediction table itself
        assert_eq!(float_values(&dashboard, "Age").unwrap()[5], Some(31.0));
    }

    #[test]
    fn test_dashboard_requires_predicted_season() {
        let predictions = df!(PLAYER => ["A"], "PTS_pred" => [1.0]).unwrap();
        let err = build_dashboard(&history(), &predictions).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingColumn(name) if name == PREDICTED_SEASON));
    }
}
