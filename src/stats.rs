//! Column names and the fixed statistic lists used across the pipeline

pub const PLAYER: &str = "Player";
pub const TEAM: &str = "Tm";
pub const TEAM_ALIAS: &str = "Team";
pub const POSITION: &str = "Pos";
pub const RANK: &str = "Rk";
pub const SEASON: &str = "season_year";
pub const PREDICTED_SEASON: &str = "predicted_season";
pub const AGE: &str = "Age";
pub const PROVENANCE: &str = "type";

/// Team code of a traded player's season-total row
pub const AGGREGATE_TEAM: &str = "TOT";

/// Columns never coerced to numbers
pub const IDENTITY_COLUMNS: [&str; 3] = [PLAYER, TEAM, POSITION];

/// Columns holding whole season numbers
pub const INTEGER_COLUMNS: [&str; 2] = [SEASON, PREDICTED_SEASON];

/// Suffix for advanced-table columns whose name clashes with a per-game column
pub const ADVANCED_SUFFIX: &str = "_adv";

/// Statistics that get a next-season target column
pub const MODELING_TARGETS: [&str; 8] = ["PTS", "TRB", "AST", "STL", "BLK", "FG%", "3P%", "FT%"];

/// Features offered to every per-statistic regression
pub const FEATURE_POOL: [&str; 11] = [
    "PTS", "TRB", "AST", "STL", "BLK", "MP", "G", "Age", "USG%", "TS%", "BPM",
];

/// A forecast statistic: its output name and the history column it is fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastTarget {
    pub name: &'static str,
    pub column: &'static str,
}

pub const FORECAST_TARGETS: [ForecastTarget; 9] = [
    ForecastTarget { name: "PTS", column: "PTS" },
    ForecastTarget { name: "TRB", column: "TRB" },
    ForecastTarget { name: "AST", column: "AST" },
    ForecastTarget { name: "STL", column: "STL" },
    ForecastTarget { name: "BLK", column: "BLK" },
    ForecastTarget { name: "FG%", column: "FG%" },
    ForecastTarget { name: "3PM", column: "3P" },
    ForecastTarget { name: "3PA", column: "3PA" },
    ForecastTarget { name: "FT%", column: "FT%" },
];

/// A made/attempted ratio derived from two forecast components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioStat {
    pub name: &'static str,
    pub makes: &'static str,
    pub attempts: &'static str,
}

pub const THREE_POINT_PCT: RatioStat = RatioStat {
    name: "3P%",
    makes: "3PM",
    attempts: "3PA",
};

/// Context columns back-filled onto prediction rows from the player's last season
pub const CARRIED_CONTEXT: [&str; 3] = ["Age", "MP", "USG%"];

/// History columns kept for the dashboard
pub const DASHBOARD_COLUMNS: [&str; 13] = [
    PLAYER, SEASON, "Age", "MP", "USG%", "PTS", "TRB", "AST", "STL", "BLK", "FG%", "3P%", "FT%",
];

/// Predicted statistics renamed onto their history column in the dashboard
pub const DASHBOARD_STATS: [&str; 8] = ["PTS", "TRB", "AST", "STL", "BLK", "FG%", "3P%", "FT%"];

pub const ACTUAL: &str = "Actual";
pub const PREDICTED: &str = "Predicted";

/// Target column name for a statistic, e.g. `FG%` -> `fg_pct_next`
pub fn next_column(stat: &str) -> String {
    format!("{}_next", stat.to_lowercase().replace('%', "_pct"))
}

/// Output column for a forecast statistic, e.g. `PTS` -> `PTS_pred`
pub fn pred_column(stat: &str) -> String {
    format!("{}_pred", stat)
}
