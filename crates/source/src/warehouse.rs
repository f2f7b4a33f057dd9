//! Snowflake warehouse column source.
//!
//! Columns are read from the database's `INFORMATION_SCHEMA.COLUMNS` view
//! through the Snowflake SQL API v2:
//! https://docs.snowflake.com/en/developer-guide/sql-api/reference

use frosty_core::config::WarehouseConfig;
use frosty_core::{AppError, AppResult, ColumnInfo, LiveColumns, QualifiedTableName};
use frosty_prompt::ColumnSource;
use serde::{Deserialize, Serialize};

const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 60;

/// Information-schema query for `table`.
///
/// Catalog names are upper-cased the way Snowflake stores unquoted
/// identifiers. Results come back in column ordinal order.
pub fn information_schema_query(table: &QualifiedTableName) -> String {
    format!(
        "SELECT COLUMN_NAME, DATA_TYPE FROM {}.INFORMATION_SCHEMA.COLUMNS \
         WHERE TABLE_SCHEMA = {} AND TABLE_NAME = {} \
         ORDER BY ORDINAL_POSITION",
        quote_identifier(&table.database().to_uppercase()),
        quote_literal(&table.schema().to_uppercase()),
        quote_literal(&table.table().to_uppercase()),
    )
}

fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// SQL API statement request body.
#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
}

/// SQL API result set (first partition only).
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
    #[serde(default)]
    message: Option<String>,
}

/// Convert (COLUMN_NAME, DATA_TYPE) rows to a live column set.
fn rows_to_columns(rows: Vec<Vec<Option<String>>>) -> AppResult<LiveColumns> {
    let mut columns = Vec::with_capacity(rows.len());

    for (i, row) in rows.into_iter().enumerate() {
        let mut cells = row.into_iter();
        let name = cells.next().flatten().ok_or_else(|| {
            AppError::Source(format!("Row {} of the column query has no COLUMN_NAME", i))
        })?;

        columns.push(match cells.next().flatten() {
            Some(data_type) => ColumnInfo::with_type(name, data_type),
            None => ColumnInfo::new(name),
        });
    }

    Ok(LiveColumns::new(columns))
}

/// Snowflake SQL API client.
pub struct SnowflakeSource {
    /// Base URL, e.g. https://xy12345.snowflakecomputing.com
    base_url: String,

    token: String,
    token_type: String,
    warehouse: Option<String>,
    role: Option<String>,
    timeout: u64,

    client: reqwest::Client,
}

impl SnowflakeSource {
    /// Create a client from config and an already resolved bearer token.
    pub fn new(config: &WarehouseConfig, token: impl Into<String>) -> Self {
        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.snowflakecomputing.com", config.account));

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            token_type: config.token_type.clone(),
            warehouse: config.warehouse.clone(),
            role: config.role.clone(),
            timeout: config.timeout.unwrap_or(DEFAULT_STATEMENT_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn statements_url(&self) -> String {
        format!("{}/api/v2/statements", self.base_url)
    }

    async fn execute(&self, statement: &str) -> AppResult<StatementResponse> {
        let body = StatementRequest {
            statement,
            timeout: self.timeout,
            warehouse: self.warehouse.as_deref(),
            role: self.role.as_deref(),
        };

        let response = self
            .client
            .post(self.statements_url())
            .bearer_auth(&self.token)
            .header("X-Snowflake-Authorization-Token-Type", self.token_type.as_str())
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Source(format!("Failed to send request to Snowflake: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Source(format!(
                "Snowflake API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Source(format!("Failed to parse Snowflake response: {}", e)))
    }
}

#[async_trait::async_trait]
impl ColumnSource for SnowflakeSource {
    fn source_name(&self) -> &str {
        "warehouse"
    }

    async fn live_columns(&self, table: &QualifiedTableName) -> AppResult<LiveColumns> {
        let statement = information_schema_query(table);
        tracing::debug!("Warehouse statement: {}", statement);

        let response = self.execute(&statement).await?;
        if let Some(message) = &response.message {
            tracing::debug!("Snowflake: {}", message);
        }

        let columns = rows_to_columns(response.data)?;
        tracing::info!("Warehouse reported {} columns for {}", columns.len(), table);

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WarehouseConfig {
        WarehouseConfig {
            account: "xy12345".to_string(),
            token_env: "SNOWFLAKE_TOKEN".to_string(),
            token_type: "OAUTH".to_string(),
            endpoint: None,
            warehouse: Some("COMPUTE_WH".to_string()),
            role: None,
            timeout: None,
            cache: true,
        }
    }

    #[test]
    fn test_query_uppercases_parts() {
        let table = QualifiedTableName::parse("frosty_sample.nba.per_game_stats").unwrap();
        assert_eq!(
            information_schema_query(&table),
            "SELECT COLUMN_NAME, DATA_TYPE FROM \"FROSTY_SAMPLE\".INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = 'NBA' AND TABLE_NAME = 'PER_GAME_STATS' \
             ORDER BY ORDINAL_POSITION"
        );
    }

    #[test]
    fn test_query_escapes_quotes() {
        let table = QualifiedTableName::parse("DB.O'BRIEN.T\"X").unwrap();
        let query = information_schema_query(&table);
        assert!(query.contains("TABLE_SCHEMA = 'O''BRIEN'"));
        assert!(query.contains("TABLE_NAME = 'T\"X'"));
    }

    #[test]
    fn test_statement_request_body() {
        let body = StatementRequest {
            statement: "SELECT 1",
            timeout: 60,
            warehouse: Some("COMPUTE_WH"),
            role: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["warehouse"], "COMPUTE_WH");
        assert!(json.get("role").is_none());
    }

    #[test]
    fn test_parse_response_rows() {
        let response: StatementResponse = serde_json::from_str(
            r#"{
                "resultSetMetaData": {"numRows": 3},
                "data": [["PLAYER", "TEXT"], ["FG%", "FLOAT"], ["PTS", null]],
                "code": "090001",
                "message": "Statement executed successfully."
            }"#,
        )
        .unwrap();

        let live = rows_to_columns(response.data).unwrap();
        assert_eq!(live.names().collect::<Vec<_>>(), vec!["PLAYER", "FG%", "PTS"]);
        assert_eq!(live.columns()[0].data_type.as_deref(), Some("TEXT"));
        assert_eq!(live.columns()[2].data_type, None);
    }

    #[test]
    fn test_row_without_name_is_error() {
        let result = rows_to_columns(vec![vec![None, Some("TEXT".to_string())]]);
        assert!(matches!(result, Err(AppError::Source(_))));
    }

    #[test]
    fn test_statements_url() {
        let source = SnowflakeSource::new(&config(), "t");
        assert_eq!(
            source.statements_url(),
            "https://xy12345.snowflakecomputing.com/api/v2/statements"
        );

        let mut custom = config();
        custom.endpoint = Some("http://localhost:8080/".to_string());
        assert_eq!(
            SnowflakeSource::new(&custom, "t").statements_url(),
            "http://localhost:8080/api/v2/statements"
        );
    }
}
