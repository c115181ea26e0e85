use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::columns::cell_reference;

/// A single cell value. Text starting with `=` is a formula literal and is never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Formula text, including the leading `=`
    pub fn as_formula(&self) -> Option<&str> {
        self.as_text().filter(|s| s.starts_with('='))
    }

    pub fn is_formula(&self) -> bool {
        self.as_formula().is_some()
    }

    /// Empty cells and empty strings
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Ordered mapping from column label to value. Columns without a value have no entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Look up a column by label, falling back to the lower-case key some sources emit
    pub fn get_column(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .get(column)
            .or_else(|| self.cells.get(column.to_ascii_lowercase().as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Row {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A named sheet. Row 0 is the header row by convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Sheet {
            name: name.into(),
            rows,
        }
    }

    pub fn has_formulas(&self) -> bool {
        self.rows
            .iter()
            .any(|row| row.values().any(CellValue::is_formula))
    }

    /// Formula cells as `(reference, formula)` in row-then-column order
    pub fn formulas(&self) -> impl Iterator<Item = (String, &str)> {
        self.rows.iter().enumerate().flat_map(|(row_idx, row)| {
            row.iter().filter_map(move |(column, value)| {
                value
                    .as_formula()
                    .map(|formula| (cell_reference(column, row_idx), formula))
            })
        })
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Row::len).sum()
    }
}

/// An ingested spreadsheet that has not been installed in the store yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
    /// SHA-256 of the source bytes, when the workbook came from a file
    pub checksum: Option<String>,
}

impl Workbook {
    pub fn new(name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Workbook {
            name: name.into(),
            sheets,
            checksum: None,
        }
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

/// The resident spreadsheet. Cloning is cheap; sheets are shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub sheets: Arc<Vec<Sheet>>,
    pub loaded_at: DateTime<Utc>,
    pub checksum: Option<String>,
    /// Name of the glossary sheet, resolved by lookup on use
    pub glossary_sheet: Option<String>,
}

impl Dataset {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// The selected glossary sheet, if one is selected and still present
    pub fn glossary(&self) -> Option<&Sheet> {
        self.glossary_sheet
            .as_deref()
            .and_then(|name| self.sheet(name))
    }
}
