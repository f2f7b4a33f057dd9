//! Local SQLite column source.
//!
//! SQLite has no database/schema qualifiers in the Snowflake sense, so only
//! the table part of the qualified name is looked up.

use frosty_core::{AppError, AppResult, ColumnInfo, LiveColumns, QualifiedTableName};
use frosty_prompt::ColumnSource;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Read `table`'s columns in declaration order.
fn table_columns(path: &Path, table: &str) -> AppResult<LiveColumns> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Source(format!("Failed to open SQLite database {:?}: {}", path, e)))?;

    let mut stmt = conn
        .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
        .map_err(|e| AppError::Source(format!("Failed to prepare column query: {}", e)))?;

    let columns = stmt
        .query_map([table], |row| {
            let name: String = row.get(0)?;
            let data_type: String = row.get(1)?;
            Ok(if data_type.is_empty() {
                ColumnInfo::new(name)
            } else {
                ColumnInfo::with_type(name, data_type)
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|e| AppError::Source(format!("Failed to read columns of {}: {}", table, e)))?;

    Ok(LiveColumns::new(columns))
}

#[async_trait::async_trait]
impl ColumnSource for SqliteSource {
    fn source_name(&self) -> &str {
        "sqlite"
    }

    async fn live_columns(&self, table: &QualifiedTableName) -> AppResult<LiveColumns> {
        let path = self.path.clone();
        let name = table.table().to_string();

        let columns = tokio::task::spawn_blocking(move || table_columns(&path, &name))
            .await
            .map_err(|e| AppError::Source(format!("SQLite task failed: {}", e)))??;

        tracing::info!("SQLite reported {} columns for {}", columns.len(), table);
        Ok(columns)
    }
}
