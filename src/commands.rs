use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::{
    self, AnalyticsReport, ExampleCategory, SpreadsheetSummary, DEFAULT_MAX_SUGGESTIONS,
};
use crate::ingest::{self, IngestError, SheetsSource};
use crate::llm::{Collaborator, HealthReport, LlmError};
use crate::search::{DatasetDescription, SearchEngine, SearchError, SearchOutcome};
use crate::sheet::Workbook;
use crate::store::{SpreadsheetStore, StoreError};

pub struct AppState<C, S> {
    pub store: SpreadsheetStore,
    pub engine: SearchEngine<C>,
    pub sheets_source: S,
}

impl<C: Collaborator, S: SheetsSource> AppState<C, S> {
    pub fn new(store: SpreadsheetStore, engine: SearchEngine<C>, sheets_source: S) -> Self {
        Self {
            store,
            engine,
            sheets_source,
        }
    }
}

/// Stable classification of every failure surfaced at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    EmptyQuery,
    NotLoaded,
    SheetNotFound,
    InvalidSourceShape,
    InvalidReference,
    FetchFailed,
    CollaboratorUnavailable,
    CollaboratorError,
    MalformedReply,
    Internal,
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        CommandError {
            kind,
            message: message.into(),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        let kind = match e {
            StoreError::NotLoaded => ErrorKind::NotLoaded,
            StoreError::SheetNotFound(_) => ErrorKind::SheetNotFound,
        };
        CommandError::new(kind, e.to_string())
    }
}

impl From<IngestError> for CommandError {
    fn from(e: IngestError) -> Self {
        let kind = match e {
            IngestError::InvalidSourceShape(_) => ErrorKind::InvalidSourceShape,
            IngestError::InvalidReference(_) => ErrorKind::InvalidReference,
            IngestError::FetchFailed(_) => ErrorKind::FetchFailed,
        };
        CommandError::new(kind, e.to_string())
    }
}

impl From<LlmError> for CommandError {
    fn from(e: LlmError) -> Self {
        let kind = if e.is_unavailable() {
            ErrorKind::CollaboratorUnavailable
        } else {
            ErrorKind::CollaboratorError
        };
        CommandError::new(kind, e.to_string())
    }
}

impl From<SearchError> for CommandError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::EmptyQuery => CommandError::new(ErrorKind::EmptyQuery, e.to_string()),
            SearchError::MalformedReply(_) => {
                CommandError::new(ErrorKind::MalformedReply, e.to_string())
            }
            SearchError::Collaborator(inner) => inner.into(),
        }
    }
}

impl From<tokio::task::JoinError> for CommandError {
    fn from(e: tokio::task::JoinError) -> Self {
        CommandError::new(ErrorKind::Internal, format!("Task join error: {}", e))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub spreadsheet: SpreadsheetSummary,
    /// Absent when the description could not be produced
    pub description: Option<DatasetDescription>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSpreadsheet {
    pub spreadsheet: Option<SpreadsheetSummary>,
    pub has_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossarySelection {
    pub selected_tab: String,
    pub message: String,
}

// Load commands

/// Install an ingested workbook and describe it
pub async fn load_workbook<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    workbook: Workbook,
) -> Result<LoadResult, CommandError> {
    let dataset = state.store.load(workbook);

    // A description failure never fails the load
    let description = match state.engine.describe(&dataset).await {
        Ok(description) => Some(description),
        Err(e) => {
            log::warn!("[load_workbook] description unavailable: {}", e);
            None
        }
    };

    Ok(LoadResult {
        spreadsheet: analytics::summarize(&dataset, state.engine.limits()),
        description,
    })
}

/// Parse an uploaded spreadsheet file and load it
pub async fn load_workbook_file<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    file_name: String,
    bytes: Vec<u8>,
) -> Result<LoadResult, CommandError> {
    log::info!("[load_workbook_file] {} ({} bytes)", file_name, bytes.len());

    let workbook = tokio::task::spawn_blocking(move || {
        let checksum = ingest::compute_checksum(&bytes);
        let parsed = ingest::parse_workbook_bytes(&bytes)?;
        ingest::workbook_from_parsed(file_name, parsed).map(|wb| wb.with_checksum(checksum))
    })
    .await??;

    load_workbook(state, workbook).await
}

/// Load a raw `{ "title", "sheets": { name: grid } }` document
pub async fn load_workbook_json<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    raw: Value,
) -> Result<LoadResult, CommandError> {
    let workbook = ingest::workbook_from_json(&raw)?;
    load_workbook(state, workbook).await
}

/// Fetch a linked Google Sheets spreadsheet and load it
pub async fn load_sheets_link<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    link: String,
) -> Result<LoadResult, CommandError> {
    log::info!("[load_sheets_link] {}", link);

    let source = state.sheets_source.fetch_by_reference(&link).await?;
    let workbook = ingest::workbook_from_grid(source.title, source.sheets)?;

    load_workbook(state, workbook).await
}

/// Drop the loaded spreadsheet, e.g. on shutdown
pub fn unload_spreadsheet<C: Collaborator, S: SheetsSource>(state: &AppState<C, S>) {
    state.store.clear();
    log::info!("[unload_spreadsheet] spreadsheet cleared");
}

// Query commands

pub async fn search<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    query: String,
) -> Result<SearchOutcome, CommandError> {
    Ok(state.engine.search(&state.store, &query).await?)
}

pub fn get_current_spreadsheet<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
) -> CurrentSpreadsheet {
    let spreadsheet = state
        .store
        .current()
        .map(|dataset| analytics::summarize(&dataset, state.engine.limits()));

    CurrentSpreadsheet {
        has_data: spreadsheet.is_some(),
        spreadsheet,
    }
}

pub fn select_glossary_tab<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    tab_name: String,
) -> Result<GlossarySelection, CommandError> {
    let selected_tab = state.store.select_glossary(&tab_name)?;

    Ok(GlossarySelection {
        message: format!("Tab \"{}\" selected as training/glossary data", selected_tab),
        selected_tab,
    })
}

// Analytics commands

pub fn get_analytics<C: Collaborator, S: SheetsSource>(state: &AppState<C, S>) -> AnalyticsReport {
    let snapshot = state.store.current();
    analytics::analytics_report(snapshot.as_ref(), state.engine.limits(), Utc::now())
}

pub fn get_suggestions<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
    partial: String,
) -> Vec<String> {
    let snapshot = state.store.current();
    analytics::suggest_queries(&partial, snapshot.as_ref(), DEFAULT_MAX_SUGGESTIONS)
}

pub fn get_examples() -> Vec<ExampleCategory> {
    analytics::example_queries()
}

pub async fn check_llm_health<C: Collaborator, S: SheetsSource>(
    state: &AppState<C, S>,
) -> HealthReport {
    state.engine.health().await
}
