//! Extract-transform-load stages: season cleaning, team deduplication,
//! season merging and the modeling table.

pub mod clean;
pub mod dedup;
pub mod merge;
pub mod modeling;

pub use clean::{clean_season, flatten_headers, normalize_raw};
pub use dedup::keep_aggregate_rows;
pub use merge::{left_join, merge_seasons};
pub use modeling::{build_modeling_table, sort_by_player_season};

use crate::config::{parse_raw_file_name, DataLayout, SeasonRange, TableKind};
use crate::error::{ProjectionError, Result};
use crate::frame::{coerce_numeric_except, concat_frames, RawTable};
use crate::stats::IDENTITY_COLUMNS;
use polars::prelude::DataFrame;
use std::fs;
use std::path::{Path, PathBuf};

/// Cached raw files of one kind within the range, ordered by season
pub fn season_files(raw_dir: &Path, kind: TableKind, range: SeasonRange) -> Result<Vec<(i32, PathBuf)>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(raw_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((year, file_kind)) = parse_raw_file_name(name) {
            if file_kind == kind && range.contains(year) {
                files.push((year, path));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Read, clean and concatenate every cached season of one kind
pub fn load_cleaned_seasons(raw_dir: &Path, kind: TableKind, range: SeasonRange) -> Result<DataFrame> {
    let files = season_files(raw_dir, kind, range)?;
    if files.is_empty() {
        return Err(ProjectionError::NoSeasonFiles {
            kind: kind.to_string(),
            start: range.start,
            end: range.end,
            dir: raw_dir.display().to_string(),
        });
    }

    let mut seasons = Vec::with_capacity(files.len());
    for (year, path) in files {
        log::debug!("Loading {}", path.display());
        let raw = RawTable::read_csv(&path)?;
        seasons.push(clean_season(&raw, year)?);
    }

    let table = concat_frames(seasons)?;
    log::info!(
        "Loaded {} {} rows for seasons {}-{}",
        table.height(),
        kind,
        range.start,
        range.end
    );
    Ok(table)
}

/// Processed per-game table: cleaned, deduplicated, numeric
pub fn build_processed_per_game(layout: &DataLayout, range: SeasonRange) -> Result<DataFrame> {
    let per_game = load_cleaned_seasons(&layout.raw_dir(), TableKind::PerGame, range)?;
    coerce_numeric_except(keep_aggregate_rows(per_game)?, &IDENTITY_COLUMNS)
}

/// Merged per-game + advanced table for the range
pub fn build_merged(layout: &DataLayout, range: SeasonRange) -> Result<DataFrame> {
    let raw_dir = layout.raw_dir();
    let per_game = keep_aggregate_rows(load_cleaned_seasons(&raw_dir, TableKind::PerGame, range)?)?;
    let advanced = keep_aggregate_rows(load_cleaned_seasons(&raw_dir, TableKind::Advanced, range)?)?;
    merge_seasons(per_game, advanced)
}
