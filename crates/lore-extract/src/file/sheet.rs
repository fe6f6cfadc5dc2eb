//! Spreadsheet extraction: XLSX workbooks and CSV files.
//!
//! Spreadsheets are not dumped cell by cell. Each sheet becomes a
//! structured summary (dimensions, columns, missing values, sample
//! rows, numeric stats, categorical uniques) sized for a summarization
//! prompt.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::warn;

use lore_core::{ContentType, Error, ExtractionResult, Result};

use super::build_result;

/// Sheets beyond this are ignored.
const MAX_SHEETS: usize = 3;
/// Rows shown in the sample block.
const SAMPLE_ROWS: usize = 5;
/// Categorical columns summarized.
const MAX_CATEGORICAL_COLS: usize = 3;
/// Unique values listed per categorical column.
const MAX_UNIQUE_LISTED: usize = 10;
/// Above this many uniques only the count is shown.
const MAX_UNIQUE_DETAIL: usize = 20;

pub(super) fn extract_workbook(path: &Path) -> Result<ExtractionResult> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        Error::validation(format!("Spreadsheet processing error: {}", e), "file")
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut entries = Vec::new();
    for name in sheet_names.into_iter().take(MAX_SHEETS) {
        let rows = workbook
            .worksheet_range(&name)
            .map(|range| {
                range
                    .rows()
                    .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
                    .collect::<Vec<_>>()
            })
            .map_err(|e| {
                Error::validation(format!("Sheet '{}' unreadable: {}", name, e), "file")
            });
        entries.push((name, rows));
    }

    let content = summarize_workbook(entries);
    if content.is_empty() {
        return Err(Error::validation(
            "Spreadsheet has no readable sheets",
            "file",
        ));
    }

    Ok(build_result(path, None, content, ContentType::Spreadsheet))
}

pub(super) fn extract_csv(path: &Path) -> Result<ExtractionResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::validation(format!("CSV processing error: {}", e), "file"))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::validation(format!("CSV processing error: {}", e), "file"))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = vec![headers];
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::validation(format!("CSV processing error: {}", e), "file"))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let content = summarize_table(&rows, None);
    Ok(build_result(path, None, content, ContentType::Spreadsheet))
}

/// Summarize each sheet, skipping unreadable ones so one corrupt sheet
/// never sinks the workbook.
fn summarize_workbook(entries: Vec<(String, Result<Vec<Vec<String>>>)>) -> String {
    let mut content = String::new();
    for (name, rows) in entries {
        match rows {
            Ok(rows) => {
                let summary = summarize_table(&rows, Some(&name));
                content.push_str(&format!("\n\n--- Sheet: {} ---\n\n{}", name, summary));
            }
            Err(e) => {
                warn!(
                    subsystem = "extract",
                    component = "sheet",
                    sheet = %name,
                    error = %e,
                    "Skipping unreadable sheet"
                );
            }
        }
    }
    content.trim().to_string()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Build the structured summary for one table. The first row is
/// treated as the header.
fn summarize_table(rows: &[Vec<String>], sheet_name: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(name) = sheet_name {
        parts.push(format!("Sheet: {}", name));
    }

    let Some((headers, data)) = rows.split_first() else {
        parts.push("Empty sheet".to_string());
        return parts.join("\n\n");
    };

    let col_count = headers.len();
    parts.push(format!(
        "Dimensions: {} rows x {} columns",
        data.len(),
        col_count
    ));
    parts.push(format!("Columns: {}", headers.join(", ")));

    // Per-column classification and missing counts.
    let mut missing = Vec::new();
    let mut numeric_cols = Vec::new();
    let mut text_cols = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        let values: Vec<&String> = data
            .iter()
            .filter_map(|row| row.get(index))
            .filter(|v| !v.trim().is_empty())
            .collect();
        let missing_count = data.len() - values.len();
        if missing_count > 0 {
            missing.push(format!("{}: {}", header, missing_count));
        }
        if values.is_empty() {
            continue;
        }
        let numbers: Vec<f64> = values
            .iter()
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect();
        if numbers.len() == values.len() {
            numeric_cols.push((header.clone(), numbers));
        } else {
            text_cols.push((header.clone(), values.iter().map(|v| v.to_string()).collect::<Vec<_>>()));
        }
    }

    if !missing.is_empty() {
        parts.push(format!("Missing Values: {}", missing.join(", ")));
    }

    if !data.is_empty() {
        let mut sample = vec![format!("Sample Data (first {} rows):", SAMPLE_ROWS)];
        sample.push(headers.join(" | "));
        for row in data.iter().take(SAMPLE_ROWS) {
            sample.push(row.join(" | "));
        }
        parts.push(sample.join("\n"));
    }

    if !numeric_cols.is_empty() {
        let mut stats = vec!["Numeric Column Statistics:".to_string()];
        for (header, numbers) in &numeric_cols {
            let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            stats.push(format!(
                "{}: min={}, max={}, mean={:.2}",
                header, min, max, mean
            ));
        }
        parts.push(stats.join("\n"));
    }

    if !text_cols.is_empty() {
        let mut uniques = vec!["Categorical Column Unique Values:".to_string()];
        for (header, values) in text_cols.iter().take(MAX_CATEGORICAL_COLS) {
            let mut seen = Vec::new();
            for value in values {
                if !seen.contains(value) {
                    seen.push(value.clone());
                }
            }
            if seen.len() <= MAX_UNIQUE_DETAIL {
                let listed: Vec<String> =
                    seen.iter().take(MAX_UNIQUE_LISTED).cloned().collect();
                uniques.push(format!(
                    "{}: [{}] (Total unique: {})",
                    header,
                    listed.join(", "),
                    seen.len()
                ));
            } else {
                uniques.push(format!("{}: {} unique values", header, seen.len()));
            }
        }
        parts.push(uniques.join("\n"));
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Vec<String>> {
        let raw = vec![
            vec!["city", "population", "region"],
            vec!["Oslo", "700000", "north"],
            vec!["Lisbon", "550000", "south"],
            vec!["Graz", "", "south"],
        ];
        raw.into_iter()
            .map(|row| row.into_iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_summarize_table_sections() {
        let summary = summarize_table(&table(), Some("Cities"));
        assert!(summary.contains("Sheet: Cities"));
        assert!(summary.contains("Dimensions: 3 rows x 3 columns"));
        assert!(summary.contains("Columns: city, population, region"));
        assert!(summary.contains("Missing Values: population: 1"));
        assert!(summary.contains("Sample Data"));
        assert!(summary.contains("Oslo | 700000 | north"));
        assert!(summary.contains("population: min=550000, max=700000, mean=625000.00"));
        assert!(summary.contains("city: [Oslo, Lisbon, Graz] (Total unique: 3)"));
        assert!(summary.contains("region: [north, south] (Total unique: 2)"));
    }

    #[test]
    fn test_summarize_workbook_skips_failing_sheet() {
        let entries = vec![
            ("Good".to_string(), Ok(table())),
            (
                "Bad".to_string(),
                Err(Error::validation("Sheet 'Bad' unreadable: boom", "file")),
            ),
            ("Other".to_string(), Ok(table())),
        ];
        let content = summarize_workbook(entries);
        assert!(content.contains("--- Sheet: Good ---"));
        assert!(content.contains("--- Sheet: Other ---"));
        assert!(!content.contains("Bad"));
    }

    #[test]
    fn test_extract_csv_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_data.csv");
        std::fs::write(&path, "item,price\nhammer,9.5\nsaw,12\n").unwrap();

        let result = extract_csv(&path).unwrap();
        assert_eq!(result.title, "Sales Data");
        assert_eq!(result.content_type, Some(ContentType::Spreadsheet));
        assert!(result.text.contains("Dimensions: 2 rows x 2 columns"));
        assert!(result.text.contains("price: min=9.5, max=12, mean=10.75"));
    }

    #[test]
    fn test_corrupt_workbook_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        let err = extract_workbook(&path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_empty_table() {
        let summary = summarize_table(&[], None);
        assert!(summary.contains("Empty sheet"));
    }
}
