//! Read-only analytics over the current dataset.

pub mod report;
pub mod stats;
pub mod suggestions;

pub use report::{
    analytics_report, summarize, summarize_tabs, AnalyticsReport, AnalyticsTotals,
    SpreadsheetSummary, TabSummary,
};
pub use stats::{compute_stats, Stats};
pub use suggestions::{example_queries, suggest_queries, ExampleCategory, DEFAULT_MAX_SUGGESTIONS};
