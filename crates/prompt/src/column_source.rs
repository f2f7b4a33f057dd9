//! Column source abstraction.
//!
//! A column source reports the live columns of a table at prompt-build
//! time. Implementations live in `frosty-source`; the static source here
//! performs no fetch at all.

use frosty_core::{AppResult, LiveColumns, QualifiedTableName};

/// Trait for live column providers (warehouse, SQLite, spreadsheet).
#[async_trait::async_trait]
pub trait ColumnSource: Send + Sync {
    /// Get the source name (e.g., "warehouse", "sheets").
    fn source_name(&self) -> &str;

    /// Fetch the live column set for `table`.
    ///
    /// An empty result means the source returned no rows.
    async fn live_columns(&self, table: &QualifiedTableName) -> AppResult<LiveColumns>;
}

/// Source that never fetches; pairs with the `Full` policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSource;

#[async_trait::async_trait]
impl ColumnSource for StaticSource {
    fn source_name(&self) -> &str {
        "static"
    }

    async fn live_columns(&self, _table: &QualifiedTableName) -> AppResult<LiveColumns> {
        Ok(LiveColumns::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source_is_empty() {
        let table = QualifiedTableName::parse("A.B.C").unwrap();
        let live = StaticSource.live_columns(&table).await.unwrap();
        assert!(live.is_empty());
        assert_eq!(StaticSource.source_name(), "static");
    }
}
