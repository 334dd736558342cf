//! Season range, table kinds and the on-disk data layout

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::char,
    combinator::{eof, map_res, value},
    IResult, Parser,
};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_START_YEAR: i32 = 2018;
pub const DEFAULT_END_YEAR: i32 = 2026;
pub const DEFAULT_SLEEP_SECS: u64 = 5;
pub const DEFAULT_BASE_URL: &str = "https://www.basketball-reference.com/";

/// Kind of per-season table published by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    PerGame,
    Advanced,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::PerGame, TableKind::Advanced];

    /// Suffix used in both the remote page name and the cache file name
    pub fn suffix(self) -> &'static str {
        match self {
            TableKind::PerGame => "per_game",
            TableKind::Advanced => "advanced",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Inclusive range of season years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRange {
    pub start: i32,
    pub end: i32,
}

impl SeasonRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl Default for SeasonRange {
    fn default() -> Self {
        Self::new(DEFAULT_START_YEAR, DEFAULT_END_YEAR)
    }
}

/// File layout under the data root. Every stage reads and writes through here.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn raw_table(&self, year: i32, kind: TableKind) -> PathBuf {
        self.raw_dir().join(raw_file_name(year, kind))
    }

    pub fn processed_per_game(&self, range: SeasonRange) -> PathBuf {
        self.processed_dir().join(format!(
            "nba_per_game_{}_{}_processed.csv",
            range.start, range.end
        ))
    }

    pub fn merged(&self, range: SeasonRange) -> PathBuf {
        self.processed_dir()
            .join(format!("nba_player_seasons_{}_{}.csv", range.start, range.end))
    }

    pub fn modeling(&self, range: SeasonRange) -> PathBuf {
        self.processed_dir()
            .join(format!("nba_player_modeling_{}_{}.csv", range.start, range.end))
    }

    pub fn predictions(&self, predicted_season: i32) -> PathBuf {
        self.processed_dir()
            .join(format!("nba_predictions_{}.csv", predicted_season))
    }

    pub fn dashboard(&self) -> PathBuf {
        self.processed_dir().join("nba_dashboard_dataset.csv")
    }
}

impl Default for DataLayout {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Cache file name for one season's table, e.g. `NBA_2021_per_game.csv`
pub fn raw_file_name(year: i32, kind: TableKind) -> String {
    format!("NBA_{}_{}.csv", year, kind.suffix())
}

fn raw_file_name_parts(input: &str) -> IResult<&str, (i32, TableKind)> {
    let (input, _) = tag("NBA_").parse(input)?;
    let (input, year) = map_res(
        take_while_m_n(4, 4, |c: char| c.is_ascii_digit()),
        |digits: &str| digits.parse::<i32>(),
    )
    .parse(input)?;
    let (input, _) = char('_').parse(input)?;
    let (input, kind) = alt((
        value(TableKind::PerGame, tag("per_game")),
        value(TableKind::Advanced, tag("advanced")),
    ))
    .parse(input)?;
    let (input, _) = tag(".csv").parse(input)?;
    let (input, _) = eof.parse(input)?;
    Ok((input, (year, kind)))
}

/// Parse a cache file name back into its season year and table kind
pub fn parse_raw_file_name(name: &str) -> Option<(i32, TableKind)> {
    raw_file_name_parts(name).ok().map(|(_, parts)| parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_file_name_round_trip() {
        assert_eq!(raw_file_name(2021, TableKind::PerGame), "NBA_2021_per_game.csv");
        assert_eq!(
            parse_raw_file_name("NBA_2021_per_game.csv"),
            Some((2021, TableKind::PerGame))
        );
        assert_eq!(
            parse_raw_file_name("NBA_2019_advanced.csv"),
            Some((2019, TableKind::Advanced))
        );
    }

    #[test]
    fn test_parse_raw_file_name_rejects_others() {
        assert_eq!(parse_raw_file_name("NBA_21_per_game.csv"), None);
        assert_eq!(parse_raw_file_name("NBA_2021_totals.csv"), None);
        assert_eq!(parse_raw_file_name("NBA_2021_per_game.csv.bak"), None);
        assert_eq!(parse_raw_file_name("nba_player_seasons_2018_2026.csv"), None);
    }

    #[test]
    fn test_layout_paths() {
        let layout = DataLayout::new("/tmp/nba");
        let range = SeasonRange::new(2018, 2026);
        assert_eq!(
            layout.raw_table(2020, TableKind::Advanced),
            PathBuf::from("/tmp/nba/raw/NBA_2020_advanced.csv")
        );
        assert_eq!(
            layout.merged(range),
            PathBuf::from("/tmp/nba/processed/nba_player_seasons_2018_2026.csv")
        );
        assert_eq!(
            layout.predictions(2027),
            PathBuf::from("/tmp/nba/processed/nba_predictions_2027.csv")
        );
    }

    #[test]
    fn test_season_range() {
        let range = SeasonRange::new(2020, 2022);
        assert!(range.contains(2020));
        assert!(range.contains(2022));
        assert!(!range.contains(2023));
        assert_eq!(range.years().collect::<Vec<_>>(), vec![2020, 2021, 2022]);
    }
}
