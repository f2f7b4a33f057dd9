//! Process-scoped memo of rendered table contexts.
//!
//! Entries are populated lazily on first use and never invalidated: the
//! inputs that form the key are static for the life of the process, so a
//! cached context stays correct until exit. Restart to pick up schema changes.

use crate::types::TableProfile;
use frosty_core::ColumnPolicy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Cache key: the static inputs a context is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    pub profile_id: String,
    pub table_name: String,
    pub description: String,
    pub policy: ColumnPolicy,
}

impl ContextKey {
    pub fn new(profile: &TableProfile, policy: ColumnPolicy) -> Self {
        Self {
            profile_id: profile.id.clone(),
            table_name: profile.table_name.to_string(),
            description: profile.description.clone(),
            policy,
        }
    }
}

/// Lookup table from [`ContextKey`] to rendered context.
#[derive(Debug, Default)]
pub struct ContextCache {
    entries: Mutex<HashMap<ContextKey, String>>,
}

static GLOBAL: OnceLock<ContextCache> = OnceLock::new();

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static ContextCache {
        GLOBAL.get_or_init(ContextCache::new)
    }

    pub fn get(&self, key: &ContextKey) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store `context` unless the key is already present; the first value wins.
    pub fn insert(&self, key: ContextKey, context: String) {
        self.lock().entry(key).or_insert(context);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContextKey, String>> {
        // Entries are inserted whole; a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::nba_profile;

    #[test]
    fn test_insert_and_get() {
        let cache = ContextCache::new();
        let key = ContextKey::new(&nba_profile().unwrap(), ColumnPolicy::Full);

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), "ctx".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("ctx"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_value_wins() {
        let cache = ContextCache::new();
        let key = ContextKey::new(&nba_profile().unwrap(), ColumnPolicy::Full);

        cache.insert(key.clone(), "first".to_string());
        cache.insert(key.clone(), "second".to_string());
        assert_eq!(cache.get(&key).as_deref(), Some("first"));
    }

    #[test]
    fn test_policy_is_part_of_key() {
        let profile = nba_profile().unwrap();
        let full = ContextKey::new(&profile, ColumnPolicy::Full);
        let filtered = ContextKey::new(&profile, ColumnPolicy::FilterByLive);
        assert_ne!(full, filtered);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(ContextCache::global(), ContextCache::global()));
    }
}
