use crate::error::Result;
use crate::stats::PLAYER;
use polars::prelude::*;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Write the dashboard table to an Excel workbook with a single sheet
pub fn write_dashboard_xlsx(table: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    write_table_sheet(worksheet, table)?;

    workbook.save(path)?;
    Ok(())
}

fn write_table_sheet(sheet: &mut Worksheet, table: &DataFrame) -> Result<()> {
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin);
    let number_format = Format::new().set_num_format("0.000");

    for (col, column) in table.get_columns().iter().enumerate() {
        let col = col as u16;
        let name = column.name().to_string();
        let width = if name == PLAYER { 24 } else { 10 };
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, name, &header_format)?;

        if column.dtype().is_primitive_numeric() {
            let values = column.cast(&DataType::Float64)?;
            for (row_idx, value) in values.f64()?.into_iter().enumerate() {
                let row = (row_idx + 1) as u32;
                match value {
                    Some(v) if v.fract() == 0.0 => {
                        sheet.write_number(row, col, v)?;
                    }
                    Some(v) => {
                        sheet.write_number_with_format(row, col, v, &number_format)?;
                    }
                    None => {}
                }
            }
        } else {
            let values = column.cast(&DataType::String)?;
            for (row_idx, value) in values.str()?.into_iter().enumerate() {
                if let Some(text) = value {
                    sheet.write_string((row_idx + 1) as u32, col, text)?;
                }
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    sheet.set_name("Dashboard")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_dashboard_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.xlsx");

        let table = df!(
            PLAYER => ["A", "A"],
            "season_year" => [2021i64, 2022],
            "PTS" => [Some(15.25), None],
            "type" => ["Actual", "Predicted"]
        )
        .unwrap();

        write_dashboard_xlsx(&table, &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
