use futures::future::join_all;
use indexmap::IndexMap;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use super::IngestError;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Cell window fetched for every sheet
const SHEET_RANGE: &str = "A1:Z1000";

/// A fetched spreadsheet: title plus one value grid per sheet, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWorkbook {
    pub title: String,
    pub sheets: IndexMap<String, Vec<Vec<Value>>>,
}

/// A remote spreadsheet host that can be read by link or id
pub trait SheetsSource: Send + Sync {
    fn fetch_by_reference(
        &self,
        reference: &str,
    ) -> impl Future<Output = Result<SourceWorkbook, IngestError>> + Send;
}

/// Extract the spreadsheet id from a Google Sheets URL, or accept a bare id
pub fn extract_spreadsheet_id(reference: &str) -> Option<String> {
    static URL_ID: OnceLock<Option<Regex>> = OnceLock::new();
    static BARE_ID: OnceLock<Option<Regex>> = OnceLock::new();

    let reference = reference.trim();

    let url_id = URL_ID
        .get_or_init(|| Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").ok())
        .as_ref()?;
    if let Some(caps) = url_id.captures(reference) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let bare_id = BARE_ID
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{20,}$").ok())
        .as_ref()?;
    bare_id.is_match(reference).then(|| reference.to_string())
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 REST client (API-key auth, read only)
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::FetchFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, IngestError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| IngestError::FetchFailed(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| IngestError::FetchFailed("Base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(tail);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, IngestError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::FetchFailed(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| IngestError::FetchFailed(format!("Invalid response body: {}", e)))
    }

    async fn fetch_sheet_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
    ) -> Result<Vec<Vec<Value>>, IngestError> {
        let range = format!("'{}'!{}", sheet.replace('\'', "''"), SHEET_RANGE);
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range.as_str()])?;
        let values: ValueRange = self.get_json(url).await?;
        Ok(values.values)
    }
}

impl SheetsSource for GoogleSheetsClient {
    async fn fetch_by_reference(&self, reference: &str) -> Result<SourceWorkbook, IngestError> {
        let spreadsheet_id = extract_spreadsheet_id(reference)
            .ok_or_else(|| IngestError::InvalidReference(reference.to_string()))?;

        log::info!("Fetching spreadsheet metadata for {}", spreadsheet_id);
        let mut url = self.spreadsheet_url(&spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "properties.title,sheets.properties.title");
        let metadata: SpreadsheetMetadata = self.get_json(url).await?;

        let titles: Vec<String> = metadata
            .sheets
            .into_iter()
            .map(|s| s.properties.title)
            .collect();
        log::info!("Found {} sheets", titles.len());

        let fetches = titles
            .iter()
            .map(|title| self.fetch_sheet_values(&spreadsheet_id, title));
        let results = join_all(fetches).await;

        let mut sheets = IndexMap::with_capacity(titles.len());
        for (title, result) in titles.into_iter().zip(results) {
            let values = match result {
                Ok(values) => {
                    log::debug!("Retrieved {} rows from sheet: {}", values.len(), title);
                    values
                }
                Err(e) => {
                    log::warn!("Error getting data from sheet {}: {}", title, e);
                    Vec::new()
                }
            };
            sheets.insert(title, values);
        }

        Ok(SourceWorkbook {
            title: metadata
                .properties
                .and_then(|p| p.title)
                .unwrap_or_else(|| "Untitled Spreadsheet".to_string()),
            sheets,
        })
    }
}
