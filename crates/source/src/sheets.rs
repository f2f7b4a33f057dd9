//! Google Sheets column source.
//!
//! Reads a fixed A1 range; the first row is the header and becomes the
//! live column set. API failures are logged and yield an empty row set so
//! the prompt degrades to the no-data marker instead of failing.

use crate::auth::CredentialManager;
use frosty_core::config::SheetsConfig;
use frosty_core::{AppError, AppResult, LiveColumns, QualifiedTableName};
use frosty_prompt::{header_columns, ColumnSource};
use serde::Deserialize;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// `spreadsheets.values.get` response.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Sheets API v4 values client.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    base_url: String,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new() -> Self {
        Self::with_base_url(SHEETS_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// URL of `spreadsheets/{id}/values/{range}`, with each segment escaped.
    pub fn values_url(&self, spreadsheet_id: &str, range: &str) -> AppResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AppError::Source(format!("Invalid Sheets base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AppError::Source("Sheets base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);

        Ok(url)
    }

    /// Fetch the cell values of `range` as rows of strings.
    pub async fn fetch_range(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> AppResult<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, range)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Source(format!("Failed to send request to Sheets: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Source(format!(
                "Sheets API error ({}): {}",
                status, error_text
            )));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| AppError::Source(format!("Failed to parse Sheets response: {}", e)))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Spreadsheet-backed column source.
pub struct SheetsSource {
    spreadsheet_id: String,
    range: String,
    client: SheetsClient,
    credentials: CredentialManager,
}

impl SheetsSource {
    pub fn new(config: &SheetsConfig, credentials: CredentialManager) -> Self {
        Self::with_client(config, credentials, SheetsClient::new())
    }

    pub fn with_client(
        config: &SheetsConfig,
        credentials: CredentialManager,
        client: SheetsClient,
    ) -> Self {
        Self {
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            client,
            credentials,
        }
    }

    /// Fetch the configured range.
    ///
    /// Credential failures propagate; API failures are logged and return no rows.
    pub async fn fetch_rows(&self) -> AppResult<Vec<Vec<String>>> {
        let token = self.credentials.access_token().await?;

        match self
            .client
            .fetch_range(&token, &self.spreadsheet_id, &self.range)
            .await
        {
            Ok(rows) => {
                tracing::debug!("Fetched {} rows from {}", rows.len(), self.range);
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!("Spreadsheet fetch failed: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait::async_trait]
impl ColumnSource for SheetsSource {
    fn source_name(&self) -> &str {
        "sheets"
    }

    async fn live_columns(&self, table: &QualifiedTableName) -> AppResult<LiveColumns> {
        let rows = self.fetch_rows().await?;
        let columns = header_columns(&rows);

        tracing::info!(
            "Spreadsheet header has {} columns for {}",
            columns.len(),
            table
        );
        Ok(columns)
    }
}
