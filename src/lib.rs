pub mod analytics;
pub mod commands;
pub mod context;
pub mod ingest;
pub mod llm;
pub mod search;
pub mod settings;
pub mod sheet;
pub mod store;

use std::time::Duration;

use commands::AppState;
use ingest::{GoogleSheetsClient, IngestError};
use llm::{LlmClient, LlmError};
use search::SearchEngine;
use settings::Settings;
use store::SpreadsheetStore;

pub use commands::{CommandError, ErrorKind};
pub use context::ContextLimits;
pub use sheet::{CellValue, Dataset, Row, Sheet, Workbook};

/// Wire the store, the Gemini collaborator and the Google Sheets source from settings.
///
/// A missing API key is not fatal: the state is still built and the health check reports it.
pub fn build_state(
    settings: &Settings,
) -> Result<AppState<LlmClient, GoogleSheetsClient>, IngestError> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);

    let mut llm = LlmClient::new(settings);
    match llm.initialize() {
        Ok(()) => log::info!("Search collaborator ready ({})", llm.model()),
        Err(LlmError::NotConfigured) => {
            log::warn!("GEMINI_API_KEY not configured, search is unavailable until it is set")
        }
        Err(e) => log::warn!("Failed to initialize LLM client: {}", e),
    }

    let sheets = GoogleSheetsClient::new(
        settings.sheets_api_key.clone(),
        settings.sheets_base_url.clone(),
        timeout,
    )?;

    Ok(AppState::new(
        SpreadsheetStore::new(),
        SearchEngine::new(llm, settings.limits.clone(), timeout),
        sheets,
    ))
}
