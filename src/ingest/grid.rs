use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

use super::file::ParsedWorkbook;
use super::IngestError;
use crate::sheet::{column_index_to_letter, CellValue, Row, Sheet, Workbook};

/// Spreadsheet error tokens replaced before storage
const ERROR_MARKERS: [&str; 4] = ["#DIV/0!", "#NAME?", "#REF!", "#VALUE!"];

const UNTITLED: &str = "Untitled Spreadsheet";

fn has_error_marker(text: &str) -> bool {
    ERROR_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Replace text containing a spreadsheet error token with `"0"`. Formulas are kept verbatim.
fn sanitize(value: CellValue) -> CellValue {
    match value {
        CellValue::Text(s) if has_error_marker(&s) => CellValue::Text("0".to_string()),
        other => other,
    }
}

/// Convert a JSON grid cell. Missing and null cells become empty strings.
fn grid_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Text(String::new()),
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => CellValue::Text(value.to_string()),
    }
}

/// Label cells by column. `CellValue::Empty` means "no entry" and is skipped.
fn labeled_row(cells: impl IntoIterator<Item = CellValue>) -> Row {
    cells
        .into_iter()
        .enumerate()
        .filter(|(_, value)| *value != CellValue::Empty)
        .map(|(col_idx, value)| (column_index_to_letter(col_idx), sanitize(value)))
        .collect()
}

/// Build a workbook from sheets, dropping zero-row sheets and rejecting duplicate names
fn assemble(name: String, sheets: Vec<Sheet>) -> Result<Workbook, IngestError> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        if !seen.insert(sheet.name.clone()) {
            return Err(IngestError::InvalidSourceShape(format!(
                "duplicate sheet name '{}'",
                sheet.name
            )));
        }
        if sheet.rows.is_empty() {
            log::debug!("Skipping empty sheet: {}", sheet.name);
            continue;
        }
        kept.push(sheet);
    }

    Ok(Workbook::new(name, kept))
}

/// Convert a sheet-name -> 2-D grid mapping into a workbook
pub fn workbook_from_grid(
    title: impl Into<String>,
    sheets: IndexMap<String, Vec<Vec<Value>>>,
) -> Result<Workbook, IngestError> {
    let sheets = sheets
        .into_iter()
        .map(|(name, grid)| {
            let rows = grid
                .iter()
                .map(|row| labeled_row(row.iter().map(grid_cell)))
                .collect();
            Sheet::new(name, rows)
        })
        .collect();

    assemble(title.into(), sheets)
}

/// Convert a raw `{ "title", "metadata", "sheets": { name: grid } }` document
pub fn workbook_from_json(raw: &Value) -> Result<Workbook, IngestError> {
    let sheets = raw
        .get("sheets")
        .and_then(Value::as_object)
        .ok_or_else(|| IngestError::InvalidSourceShape("missing 'sheets' collection".to_string()))?;

    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .or_else(|| raw.pointer("/metadata/properties/title").and_then(Value::as_str))
        .unwrap_or(UNTITLED)
        .to_string();

    let mut grids = IndexMap::with_capacity(sheets.len());
    for (name, values) in sheets {
        let grid = match values {
            Value::Null => Vec::new(),
            Value::Array(rows) => rows
                .iter()
                .map(|row| row.as_array().cloned().unwrap_or_default())
                .collect(),
            _ => {
                return Err(IngestError::InvalidSourceShape(format!(
                    "sheet '{}' is not a grid of values",
                    name
                )))
            }
        };
        grids.insert(name.clone(), grid);
    }

    workbook_from_grid(title, grids)
}

/// Convert the file parser's output into a workbook
pub fn workbook_from_parsed(
    name: impl Into<String>,
    parsed: ParsedWorkbook,
) -> Result<Workbook, IngestError> {
    let sheets = parsed
        .sheets
        .into_iter()
        .map(|sheet| {
            let rows = sheet.rows.into_iter().map(labeled_row).collect();
            Sheet::new(sheet.name, rows)
        })
        .collect();

    assemble(name.into(), sheets)
}
