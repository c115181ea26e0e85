//! Ingestion: turning external spreadsheet shapes into the canonical model.
//!
//! This module provides:
//! - Grid conversion (sheet name -> 2-D value grid) with error-marker sanitization
//! - File parsing for xlsx/xls/xlsb/ods through calamine
//! - Fetching a shared Google Sheets spreadsheet by link

pub mod file;
pub mod grid;
pub mod sheets_link;

use thiserror::Error;

pub use file::{compute_checksum, parse_workbook_bytes, ParsedSheet, ParsedWorkbook};
pub use grid::{workbook_from_grid, workbook_from_json, workbook_from_parsed};
pub use sheets_link::{extract_spreadsheet_id, GoogleSheetsClient, SheetsSource, SourceWorkbook};

/// Errors raised while ingesting a spreadsheet
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid spreadsheet data structure: {0}")]
    InvalidSourceShape(String),

    #[error("Invalid Google Sheets URL: {0}")]
    InvalidReference(String),

    #[error("Failed to fetch spreadsheet data: {0}")]
    FetchFailed(String),
}
