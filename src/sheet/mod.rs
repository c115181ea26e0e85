//! Canonical spreadsheet model shared by every ingestion path.
//!
//! This module provides:
//! - Cell, row and sheet types
//! - The unloaded `Workbook` and the resident `Dataset`
//! - Column letter math and the header-row convention

pub mod columns;
pub mod types;

pub use columns::{cell_reference, column_index_to_letter, header_row, letter_to_column_index};
pub use types::*;
