use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats::{compute_stats, Stats};
use crate::context::ContextLimits;
use crate::sheet::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSummary {
    pub name: String,
    pub row_count: usize,
    pub has_formulas: bool,
    pub is_glossary_tab: bool,
}

/// What the boundary shows for the current spreadsheet
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetSummary {
    pub file_name: String,
    pub stats: Stats,
    pub tabs: Vec<TabSummary>,
    pub selected_glossary_tab: Option<String>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTotals {
    pub file_name: String,
    pub total_sheets: usize,
    pub total_cells: usize,
    pub total_formulas: usize,
    pub business_concepts: usize,
    pub selected_glossary_tab: Option<String>,
    pub tabs: Vec<TabSummary>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub totals: Option<AnalyticsTotals>,
    pub generated_at: DateTime<Utc>,
}

pub fn summarize_tabs(dataset: &Dataset) -> Vec<TabSummary> {
    let glossary = dataset.glossary_sheet.as_deref();
    dataset
        .sheets
        .iter()
        .map(|sheet| TabSummary {
            name: sheet.name.clone(),
            row_count: sheet.rows.len(),
            has_formulas: sheet.has_formulas(),
            is_glossary_tab: glossary == Some(sheet.name.as_str()),
        })
        .collect()
}

pub fn summarize(dataset: &Dataset, limits: &ContextLimits) -> SpreadsheetSummary {
    SpreadsheetSummary {
        file_name: dataset.name.clone(),
        stats: compute_stats(&dataset.sheets, limits),
        tabs: summarize_tabs(dataset),
        selected_glossary_tab: dataset.glossary_sheet.clone(),
        processed_at: dataset.loaded_at,
    }
}

/// Totals over the current snapshot, or a "No spreadsheet loaded" report
pub fn analytics_report(
    snapshot: Option<&Dataset>,
    limits: &ContextLimits,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let Some(dataset) = snapshot else {
        return AnalyticsReport {
            has_data: false,
            message: Some("No spreadsheet loaded".to_string()),
            totals: None,
            generated_at: now,
        };
    };

    let summary = summarize(dataset, limits);
    AnalyticsReport {
        has_data: true,
        message: None,
        totals: Some(AnalyticsTotals {
            file_name: summary.file_name,
            total_sheets: summary.stats.sheets,
            total_cells: summary.stats.total_cells,
            total_formulas: summary.stats.formula_cells,
            business_concepts: summary.stats.business_concepts.len(),
            selected_glossary_tab: summary.selected_glossary_tab,
            tabs: summary.tabs,
            processed_at: summary.processed_at,
        }),
        generated_at: now,
    }
}
