//! Column source factory.
//!
//! Resolves the configured source kind to a concrete `ColumnSource`,
//! injecting secrets and resolving workspace-relative paths.

use crate::auth::CredentialManager;
use crate::sheets::SheetsSource;
use crate::sqlite::SqliteSource;
use crate::warehouse::SnowflakeSource;
use frosty_core::{AppConfig, AppResult, SourceKind};
use frosty_prompt::{ColumnSource, StaticSource};

/// Create the column source selected by `config.source`.
///
/// # Errors
/// Returns error if the source's config section is missing or the
/// warehouse token environment variable is unset.
pub fn create_source(config: &AppConfig) -> AppResult<Box<dyn ColumnSource>> {
    match config.source {
        SourceKind::Static => Ok(Box::new(StaticSource)),
        SourceKind::Warehouse => {
            let warehouse = config.warehouse()?;
            let token = config.resolve_warehouse_token()?;
            Ok(Box::new(SnowflakeSource::new(warehouse, token)))
        }
        SourceKind::Sqlite => {
            let path = config.resolve_path(&config.sqlite()?.path);
            Ok(Box::new(SqliteSource::new(path)))
        }
        SourceKind::Sheets => {
            let sheets = config.sheets()?;
            Ok(Box::new(SheetsSource::new(sheets, credentials(config)?)))
        }
    }
}

/// Credential manager for the configured spreadsheet.
pub fn credentials(config: &AppConfig) -> AppResult<CredentialManager> {
    let sheets = config.sheets()?;
    Ok(CredentialManager::new(
        config.resolve_path(&sheets.token_path),
        config.resolve_path(&sheets.client_secret_path),
    ))
}

/// Whether rendered contexts for this config are memoized for the process.
pub fn uses_context_cache(config: &AppConfig) -> bool {
    match config.source {
        SourceKind::Warehouse => config
            .sources
            .warehouse
            .as_ref()
            .map(|w| w.cache)
            .unwrap_or(false),
        SourceKind::Static | SourceKind::Sqlite | SourceKind::Sheets => false,
    }
}
