//! Prompt assembly over a column source.
//!
//! Fetches the live column set, renders the table context, and substitutes
//! it into the instruction template. With a cache attached, the fetch runs
//! at most once per [`ContextKey`].

use crate::builder::{build_table_context, render_system_prompt};
use crate::cache::{ContextCache, ContextKey};
use crate::column_source::ColumnSource;
use crate::types::{SystemPrompt, TableProfile};
use frosty_core::{AppResult, ColumnPolicy};

/// Builds system prompts for profiles using one column source.
pub struct PromptAssembler<'a> {
    source: &'a dyn ColumnSource,
    cache: Option<&'a ContextCache>,
}

impl<'a> PromptAssembler<'a> {
    /// Assembler that fetches on every call.
    pub fn new(source: &'a dyn ColumnSource) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Memoize rendered contexts in `cache`.
    pub fn with_cache(mut self, cache: &'a ContextCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Render the table context, or `None` if `FilterByLive` found no live rows.
    pub async fn table_context(
        &self,
        profile: &TableProfile,
        policy: ColumnPolicy,
    ) -> AppResult<Option<String>> {
        let key = ContextKey::new(profile, policy);

        if let Some(cached) = self.cache.and_then(|cache| cache.get(&key)) {
            tracing::debug!("Context cache hit for {}", profile.table_name);
            return Ok(Some(cached));
        }

        tracing::info!(
            "Fetching live columns for {} from {}",
            profile.table_name,
            self.source.source_name()
        );
        let live = self.source.live_columns(&profile.table_name).await?;
        tracing::debug!("Source returned {} columns", live.len());

        if policy == ColumnPolicy::FilterByLive && live.is_empty() {
            tracing::warn!(
                "{} returned no rows for {}",
                self.source.source_name(),
                profile.table_name
            );
            return Ok(None);
        }

        let context = build_table_context(profile, &live, policy)?;

        if let Some(cache) = self.cache {
            cache.insert(key, context.clone());
        }

        Ok(Some(context))
    }

    /// Build the full system prompt for `profile`.
    pub async fn system_prompt(
        &self,
        profile: &TableProfile,
        policy: ColumnPolicy,
    ) -> AppResult<SystemPrompt> {
        match self.table_context(profile, policy).await? {
            Some(context) => Ok(SystemPrompt::Ready(render_system_prompt(
                profile, &context,
            )?)),
            None => Ok(SystemPrompt::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_source::StaticSource;
    use crate::defaults::{nba_profile, QUALIFIED_TABLE_NAME};
    use crate::types::NO_DATA_SENTINEL;
    use frosty_core::{AppError, LiveColumns, QualifiedTableName};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source returning fixed columns and counting fetches.
    struct CountingSource {
        columns: Vec<&'static str>,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new(columns: Vec<&'static str>) -> Self {
            Self {
                columns,
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ColumnSource for CountingSource {
        fn source_name(&self) -> &str {
            "counting"
        }

        async fn live_columns(&self, _table: &QualifiedTableName) -> AppResult<LiveColumns> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(LiveColumns::from_names(self.columns.iter().copied()))
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl ColumnSource for FailingSource {
        fn source_name(&self) -> &str {
            "failing"
        }

        async fn live_columns(&self, _table: &QualifiedTableName) -> AppResult<LiveColumns> {
            Err(AppError::Source("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_static_full_prompt() {
        let profile = nba_profile().unwrap();
        let prompt = PromptAssembler::new(&StaticSource)
            .system_prompt(&profile, ColumnPolicy::Full)
            .await
            .unwrap();

        let text = prompt.as_text();
        assert!(text.contains(&format!("<tableName> {} </tableName>", QUALIFIED_TABLE_NAME)));
        assert!(text.contains(&profile.description));
        assert!(text.contains("- **PTS**: Points"));
    }

    #[tokio::test]
    async fn test_cached_assembler_fetches_once() {
        let profile = nba_profile().unwrap();
        let source = CountingSource::new(vec!["PLAYER", "PTS"]);
        let cache = ContextCache::new();
        let assembler = PromptAssembler::new(&source).with_cache(&cache);

        let first = assembler
            .system_prompt(&profile, ColumnPolicy::Full)
            .await
            .unwrap();
        let second = assembler
            .system_prompt(&profile, ColumnPolicy::Full)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(source.fetches(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_uncached_assembler_refetches() {
        let profile = nba_profile().unwrap();
        let source = CountingSource::new(vec!["PLAYER"]);
        let assembler = PromptAssembler::new(&source);

        assembler.system_prompt(&profile, ColumnPolicy::Full).await.unwrap();
        assembler.system_prompt(&profile, ColumnPolicy::Full).await.unwrap();

        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_full_policy_same_output_for_any_live_set() {
        let profile = nba_profile().unwrap();
        let narrow = CountingSource::new(vec!["PLAYER"]);
        let wide = CountingSource::new(vec!["PLAYER", "AST", "UNKNOWN"]);

        let a = PromptAssembler::new(&narrow)
            .system_prompt(&profile, ColumnPolicy::Full)
            .await
            .unwrap();
        let b = PromptAssembler::new(&wide)
            .system_prompt(&profile, ColumnPolicy::Full)
            .await
            .unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_filter_policy_subset() {
        let profile = nba_profile().unwrap();
        let source = CountingSource::new(vec!["PTS", "AGE", "PLAYER"]);

        let context = PromptAssembler::new(&source)
            .table_context(&profile, ColumnPolicy::FilterByLive)
            .await
            .unwrap()
            .unwrap();

        let rendered: Vec<&str> = context
            .lines()
            .filter(|l| l.starts_with("- **"))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "- **PLAYER**: The player name",
                "- **AGE**: The player's age",
                "- **PTS**: Points",
            ]
        );
    }

    #[tokio::test]
    async fn test_filter_policy_no_rows_is_sentinel() {
        let profile = nba_profile().unwrap();
        let source = CountingSource::new(vec![]);
        let cache = ContextCache::new();

        let prompt = PromptAssembler::new(&source)
            .with_cache(&cache)
            .system_prompt(&profile, ColumnPolicy::FilterByLive)
            .await
            .unwrap();

        assert_eq!(prompt.to_string(), NO_DATA_SENTINEL);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_source_errors_propagate() {
        let profile = nba_profile().unwrap();
        let result = PromptAssembler::new(&FailingSource)
            .system_prompt(&profile, ColumnPolicy::Full)
            .await;

        assert!(matches!(result, Err(AppError::Source(_))));
    }
}
