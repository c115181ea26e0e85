use indexmap::IndexSet;
use serde::Serialize;

use crate::sheet::{header_row, Dataset};

pub const DEFAULT_MAX_SUGGESTIONS: usize = 8;

const GENERIC_QUERIES: [&str; 4] = [
    "Find maximum values",
    "Show totals and averages",
    "Calculate growth rates",
    "Compare performance metrics",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleCategory {
    pub category: &'static str,
    pub queries: Vec<&'static str>,
}

/// Query completions built from the dataset's header texts
pub fn suggest_queries(partial: &str, snapshot: Option<&Dataset>, max: usize) -> Vec<String> {
    if partial.chars().count() < 2 {
        return Vec::new();
    }
    let Some(dataset) = snapshot else {
        return Vec::new();
    };

    let headers = header_texts(dataset);
    headers
        .iter()
        .take(5)
        .map(|h| format!("Find all {} data", h))
        .chain(headers.iter().take(3).map(|h| format!("Show {} values", h)))
        .chain(GENERIC_QUERIES.iter().map(|q| q.to_string()))
        .take(max)
        .collect()
}

fn header_texts(dataset: &Dataset) -> IndexSet<String> {
    dataset
        .sheets
        .iter()
        .filter_map(|sheet| header_row(&sheet.rows))
        .flat_map(|header| header.values())
        .filter_map(|value| value.as_text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn example_queries() -> Vec<ExampleCategory> {
    vec![
        ExampleCategory {
            category: "Financial Metrics",
            queries: vec![
                "Find all revenue data",
                "Show profit calculations",
                "Where are my margins?",
                "Calculate growth rates",
            ],
        },
        ExampleCategory {
            category: "Performance Analysis",
            queries: vec![
                "Find top performers",
                "Show efficiency metrics",
                "Compare quarterly results",
                "Analyze trends over time",
            ],
        },
        ExampleCategory {
            category: "Data Exploration",
            queries: vec![
                "Show all calculations",
                "Find percentage values",
                "Where are the totals?",
                "List all metrics",
            ],
        },
    ]
}
