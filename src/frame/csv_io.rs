use super::coerce_numeric_except;
use crate::error::Result;
use crate::stats::{IDENTITY_COLUMNS, PROVENANCE};
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Read a CSV written by the pipeline. Identity and provenance columns stay
/// text; every other column is numeric.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let mut keep_text = IDENTITY_COLUMNS.to_vec();
    keep_text.push(PROVENANCE);
    coerce_numeric_except(df, &keep_text)
}

/// Write the frame as CSV, creating parent directories and overwriting
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{float_values, int_values, text_values};

    #[test]
    fn test_read_frame_types_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seasons.csv");
        fs::write(
            &path,
            "Player,Pos,season_year,PTS\n\"Smith, J\",G,2021,10.5\nB,,2021.0,\n",
        )
        .unwrap();

        let df = read_frame(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("Pos").unwrap().dtype(), &DataType::String);
        assert_eq!(text_values(&df, "Player").unwrap()[0].as_deref(), Some("Smith, J"));
        assert_eq!(text_values(&df, "Pos").unwrap()[1], None);
        assert_eq!(int_values(&df, "season_year").unwrap(), vec![Some(2021), Some(2021)]);
        assert_eq!(float_values(&df, "PTS").unwrap(), vec![Some(10.5), None]);
    }

    #[test]
    fn test_write_frame_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut df = df!("Player" => ["A"], "season_year" => [2021i64]).unwrap();
        write_frame(&mut df, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Player,season_year\nA,2021\n");
        assert_eq!(read_frame(&path).unwrap().height(), 1);
    }
}
