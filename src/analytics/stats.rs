use indexmap::IndexSet;
use serde::Serialize;

use crate::context::ContextLimits;
use crate::sheet::{header_row, CellValue, Sheet};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub sheets: usize,
    pub total_cells: usize,
    pub formula_cells: usize,
    /// Distinct lower-cased header texts, first-seen order
    pub business_concepts: Vec<String>,
}

pub fn compute_stats(sheets: &[Sheet], limits: &ContextLimits) -> Stats {
    let total_cells = sheets.iter().map(Sheet::cell_count).sum();
    let formula_cells = sheets
        .iter()
        .flat_map(|sheet| sheet.rows.iter())
        .map(|row| row.values().filter(|v| v.is_formula()).count())
        .sum();

    Stats {
        sheets: sheets.len(),
        total_cells,
        formula_cells,
        business_concepts: business_concepts(sheets, limits.max_concepts),
    }
}

fn business_concepts(sheets: &[Sheet], max: usize) -> Vec<String> {
    let mut concepts = IndexSet::new();

    for header in sheets.iter().filter_map(|sheet| header_row(&sheet.rows)) {
        for value in header.values() {
            if let CellValue::Text(text) = value {
                if !text.trim().is_empty() {
                    concepts.insert(text.to_lowercase());
                }
            }
        }
    }

    concepts.into_iter().take(max).collect()
}
