//! Extraction of the first statistics table from a season page

use crate::error::{ProjectionError, Result};
use crate::frame::RawTable;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ProjectionError::Html(format!("Invalid selector {}: {:?}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn colspan(cell: &ElementRef) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Parse the first `<table>` of a page. Each `<thead>` row becomes a header
/// level with cells repeated over their `colspan`; each `<tbody>` row is a
/// data row of its `th`/`td` texts. `<tfoot>` is ignored.
pub fn parse_first_table(html: &str) -> Result<RawTable> {
    let document = Html::parse_document(html);

    let table_selector = selector("table")?;
    let header_row_selector = selector("thead tr")?;
    let body_row_selector = selector("tbody tr")?;
    let cell_selector = selector("th, td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| ProjectionError::Html("No <table> element found".to_string()))?;

    let mut header_levels = Vec::new();
    for row in table.select(&header_row_selector) {
        let mut level = Vec::new();
        for cell in row.select(&cell_selector) {
            let text = cell_text(&cell);
            for _ in 0..colspan(&cell) {
                level.push(text.clone());
            }
        }
        header_levels.push(level);
    }

    let mut rows = Vec::new();
    for row in table.select(&body_row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(|c| cell_text(&c)).collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if header_levels.is_empty() && rows.is_empty() {
        return Err(ProjectionError::Html("First table has no rows".to_string()));
    }

    // A table without <thead> uses its first row as the header
    if header_levels.is_empty() {
        header_levels.push(rows.remove(0));
    }

    Ok(RawTable::new(header_levels, rows))
}
