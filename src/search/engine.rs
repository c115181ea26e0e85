use std::time::Duration;

use super::prompt::{build_description_prompt, build_search_prompt};
use super::{parse_reply, DatasetDescription, SearchError, SearchOutcome};
use crate::context::{build_context, build_main_context, ContextLimits};
use crate::llm::{check_health, Collaborator, HealthReport, LlmError};
use crate::sheet::Dataset;
use crate::store::SpreadsheetStore;

/// Answers queries about the current dataset through a single collaborator call each
pub struct SearchEngine<C> {
    collaborator: C,
    limits: ContextLimits,
    timeout: Duration,
}

impl<C: Collaborator> SearchEngine<C> {
    pub fn new(collaborator: C, limits: ContextLimits, timeout: Duration) -> Self {
        Self {
            collaborator,
            limits,
            timeout,
        }
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    pub fn limits(&self) -> &ContextLimits {
        &self.limits
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.collaborator.generate(prompt)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LlmError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Answer `query` against the store's current snapshot. Never mutates the store.
    pub async fn search(
        &self,
        store: &SpreadsheetStore,
        query: &str,
    ) -> Result<SearchOutcome, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let Some(dataset) = store.current() else {
            log::info!("Search for '{}' with no spreadsheet loaded", query);
            return Ok(SearchOutcome::no_data(query));
        };

        let context = build_context(&dataset, &self.limits);
        let prompt = build_search_prompt(query, &context);
        log::debug!(
            "Searching '{}' across {} sheets ({} context chars, glossary: {})",
            query,
            dataset.sheets.len(),
            context.main.chars().count(),
            context.glossary.as_ref().map(|(name, _)| name.as_str()).unwrap_or("none")
        );

        let raw = self.generate(&prompt).await.map_err(|e| {
            log::warn!("Search collaborator call failed: {}", e);
            e
        })?;

        let result = parse_reply(query, &raw)?;
        log::info!("Search for '{}' answered from {:?}", query, result.tabs_used);
        Ok(SearchOutcome::Answered(result))
    }

    /// One-sentence description of a dataset. A quota failure degrades to a local summary.
    pub async fn describe(&self, dataset: &Dataset) -> Result<DatasetDescription, SearchError> {
        let main = build_main_context(&dataset.sheets, &self.limits);
        let prompt = build_description_prompt(&main);

        match self.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(LlmError::EmptyResponse.into());
                }
                Ok(DatasetDescription {
                    text: text.to_string(),
                    is_from_collaborator: true,
                })
            }
            Err(e) if e.is_quota_exceeded() => {
                log::warn!(
                    "Quota exceeded while describing '{}', using local summary",
                    dataset.name
                );
                Ok(fallback_description(dataset))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn health(&self) -> HealthReport {
        check_health(&self.collaborator).await
    }
}

fn fallback_description(dataset: &Dataset) -> DatasetDescription {
    let names: Vec<&str> = dataset.sheet_names().collect();
    let cells: usize = dataset.sheets.iter().map(|sheet| sheet.cell_count()).sum();

    DatasetDescription {
        text: format!(
            "Business data with {} sheets ({}) containing {} cells of metrics and KPIs.",
            names.len(),
            names.join(", "),
            cells
        ),
        is_from_collaborator: false,
    }
}
