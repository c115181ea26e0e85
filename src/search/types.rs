use serde::{Deserialize, Serialize};

/// Normalized answer to one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub query: String,
    pub answer: String,
    pub location: String,
    /// Always text; structured reply values are serialized
    pub value: String,
    pub explanation: String,
    pub calculation: String,
    pub tabs_used: Vec<String>,
    pub alternatives: Vec<String>,
    pub suggestion: String,
    /// False for a degraded local fallback
    pub is_from_collaborator: bool,
}

/// Outcome of a search. `NoDataLoaded` is informational, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Answered(SearchResult),
    NoDataLoaded {
        query: String,
        answer: String,
        message: String,
    },
}

impl SearchOutcome {
    pub fn no_data(query: impl Into<String>) -> Self {
        SearchOutcome::NoDataLoaded {
            query: query.into(),
            answer: "No spreadsheet loaded".to_string(),
            message: "Please upload a spreadsheet first to enable search.".to_string(),
        }
    }

    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            SearchOutcome::Answered(result) => Some(result),
            SearchOutcome::NoDataLoaded { .. } => None,
        }
    }
}

/// One-line summary of what a dataset contains
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescription {
    pub text: String,
    pub is_from_collaborator: bool,
}
