//! DataFrame helpers shared by every pipeline stage

mod csv_io;
mod raw;

pub use csv_io::{read_frame, write_frame};
pub use raw::RawTable;

use crate::error::{ProjectionError, Result};
use crate::stats::INTEGER_COLUMNS;
use polars::prelude::*;
use std::collections::HashSet;

/// Make header labels unique and non-empty: blanks become `Unnamed: <i>`,
/// repeats get `.1`, `.2`, ... suffixes.
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, label) in raw.iter().enumerate() {
        let label = label.as_ref().trim();
        let base = if label.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            label.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }

    out
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|name| name.to_string()).collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ProjectionError::MissingColumn(name.to_string()))
}

/// Numeric view of a column; unparseable and non-finite values are `None`
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = require_column(df, name)?.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Whole-number view of a column, e.g. seasons stored as `2021` or `2021.0`
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    Ok(float_values(df, name)?
        .into_iter()
        .map(|v| v.map(|x| x.round() as i64))
        .collect())
}

pub fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Project onto the listed columns that exist, in the order given
pub fn select_existing<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<DataFrame> {
    let picked: Vec<&str> = names
        .iter()
        .map(|n| n.as_ref())
        .filter(|n| has_column(df, n))
        .collect();
    Ok(df.select(picked)?)
}

/// Cast every column not listed in `keep_text` to numbers. Unparseable
/// text becomes null; season columns become integers.
pub fn coerce_numeric_except(df: DataFrame, keep_text: &[&str]) -> Result<DataFrame> {
    let casts: Vec<Expr> = column_names(&df)
        .into_iter()
        .filter(|name| !keep_text.contains(&name.as_str()))
        .map(|name| {
            let numeric = col(name.as_str()).cast(DataType::Float64);
            if INTEGER_COLUMNS.contains(&name.as_str()) {
                numeric.cast(DataType::Int64)
            } else {
                numeric
            }
        })
        .collect();

    if casts.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(casts).collect()?)
}

/// Row-wise union. Columns are the union in first-seen order; cells a
/// frame lacks are null.
pub fn concat_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    if frames.is_empty() {
        return Ok(DataFrame::empty());
    }
    let lazy: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();
    let args = UnionArgs {
        to_supertypes: true,
        ..Default::default()
    };
    Ok(concat_lf_diagonal(lazy, args)?.collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Player" => ["A", "B"],
            "PTS" => ["10", "x"],
            "season_year" => ["2021", "2021.0"]
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_headers() {
        let headers = normalize_headers(&["Rk", " Player ", "", "MP", "MP"]);
        assert_eq!(headers, vec!["Rk", "Player", "Unnamed: 2", "MP", "MP.1"]);
    }

    #[test]
    fn test_coerce_numeric_except() {
        let df = coerce_numeric_except(sample(), &["Player"]).unwrap();
        assert_eq!(df.column("PTS").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("season_year").unwrap().dtype(), &DataType::Int64);
        assert_eq!(float_values(&df, "PTS").unwrap(), vec![Some(10.0), None]);
        assert_eq!(int_values(&df, "season_year").unwrap(), vec![Some(2021), Some(2021)]);
        assert_eq!(
            text_values(&df, "Player").unwrap(),
            vec![Some("A".to_string()), Some("B".to_string())]
        );
    }

    #[test]
    fn test_float_values_lenient() {
        let df = df!("v" => [" .345", "12*", "NaN", ""]).unwrap();
        let values = float_values(&df, "v").unwrap();
        assert_eq!(values[1], None);
        assert_eq!(values[2], None);
        assert_eq!(values[3], None);
    }

    #[test]
    fn test_select_existing_skips_missing() {
        let df = select_existing(&sample(), &["PTS", "Nope", "Player"]).unwrap();
        assert_eq!(column_names(&df), vec!["PTS", "Player"]);
    }

    #[test]
    fn test_require_column() {
        assert!(require_column(&sample(), "PTS").is_ok());
        assert!(matches!(
            require_column(&sample(), "AST"),
            Err(ProjectionError::MissingColumn(name)) if name == "AST"
        ));
    }

    #[test]
    fn test_concat_unions_columns() {
        let other = df!("PTS" => [3.0], "AST" => [4.0]).unwrap();
        let first = coerce_numeric_except(sample(), &["Player"]).unwrap();

        let combined = concat_frames(vec![first, other]).unwrap();
        assert_eq!(column_names(&combined), vec!["Player", "PTS", "season_year", "AST"]);
        assert_eq!(combined.height(), 3);
        assert_eq!(float_values(&combined, "AST").unwrap(), vec![None, None, Some(4.0)]);
        assert_eq!(text_values(&combined, "Player").unwrap()[2], None);
    }
}
