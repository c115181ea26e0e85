use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Cursor;

use super::IngestError;
use crate::sheet::CellValue;

/// Sheet-oriented output of the file parser, before column labeling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkbook {
    pub sheets: Vec<ParsedSheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub name: String,
    /// Rows anchored at A1; index 0 of each row is column A
    pub rows: Vec<Vec<CellValue>>,
}

/// Parse xlsx/xlsm/xlsb/xls/ods bytes. Formulas are kept as `=` text, never evaluated.
pub fn parse_workbook_bytes(bytes: &[u8]) -> Result<ParsedWorkbook, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::InvalidSourceShape(format!("Failed to open workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let values = workbook.worksheet_range(&name).map_err(|e| {
            IngestError::InvalidSourceShape(format!("Failed to read sheet '{}': {}", name, e))
        })?;

        // Not every format exposes formulas; values alone are still usable
        let formulas = match workbook.worksheet_formula(&name) {
            Ok(range) => formula_cells(&range),
            Err(e) => {
                log::debug!("No formulas read for sheet '{}': {}", name, e);
                HashMap::new()
            }
        };

        let rows = anchored_rows(&values, &formulas);
        log::debug!("Parsed sheet '{}' with {} rows", name, rows.len());
        sheets.push(ParsedSheet { name, rows });
    }

    Ok(ParsedWorkbook { sheets })
}

/// Formula text keyed by absolute (row, col)
fn formula_cells(range: &Range<String>) -> HashMap<(usize, usize), String> {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    range
        .used_cells()
        .filter(|(_, _, formula)| !formula.is_empty())
        .map(|(row, col, formula)| {
            let text = if formula.starts_with('=') {
                formula.clone()
            } else {
                format!("={}", formula)
            };
            ((start_row + row, start_col + col), text)
        })
        .collect()
}

/// Lay the value range out from A1 so column labels match the source sheet
fn anchored_rows(
    range: &Range<Data>,
    formulas: &HashMap<(usize, usize), String>,
) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let (row_count, col_count) = range.get_size();

    let mut rows = Vec::with_capacity(start_row + row_count);
    rows.resize_with(start_row, Vec::new);

    for row_idx in 0..row_count {
        let mut row_data = vec![CellValue::Empty; start_col];

        for col_idx in 0..col_count {
            let absolute = (start_row + row_idx, start_col + col_idx);
            let cell_value = match formulas.get(&absolute) {
                Some(formula) => CellValue::Text(formula.clone()),
                None => convert_cell_value(range.get((row_idx, col_idx))),
            };
            row_data.push(cell_value);
        }

        // Trailing empties carry no information
        while matches!(row_data.last(), Some(CellValue::Empty)) {
            row_data.pop();
        }
        rows.push(row_data);
    }

    rows
}

/// Convert calamine Data to our CellValue
fn convert_cell_value(cell: Option<&Data>) -> CellValue {
    match cell {
        None => CellValue::Empty,
        Some(data) => match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Text(format_excel_datetime(dt.as_f64())),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            // Error tokens (#DIV/0! etc.) are sanitized during ingestion
            Data::Error(e) => CellValue::Text(e.to_string()),
        },
    }
}

/// Format Excel datetime (days since 1899-12-30) to ISO 8601.
/// Serials outside chrono's date range are kept as the raw number.
fn format_excel_datetime(value: f64) -> String {
    let days = value.floor();
    let seconds = ((value - days) * 86400.0).round() as i64;

    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.checked_add_signed(TimeDelta::try_days(days as i64)?))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.checked_add_signed(TimeDelta::try_seconds(seconds)?))
        .map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Compute SHA-256 checksum of uploaded bytes
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
