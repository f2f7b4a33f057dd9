//! Prompt types for Frosty.
//!
//! This module defines the domain entities for prompt assembly: column
//! descriptors, table profiles, and the final system prompt.

use frosty_core::{ColumnPolicy, LiveColumns, QualifiedTableName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text returned in place of a prompt when the live fetch produced no rows.
pub const NO_DATA_SENTINEL: &str = "Error: no data was found in the spreadsheet.";

/// Heading rendered above the column list when a profile sets none.
pub const DEFAULT_COLUMNS_HEADING: &str = "Here are the columns available in the table:";

/// Ordered mapping from column name to human-readable description.
///
/// Insertion order is the render order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnDescriptor(IndexMap<String, String>);

impl ColumnDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, keeping its original position if it already exists.
    pub fn insert(&mut self, name: impl Into<String>, description: impl Into<String>) {
        self.0.insert(name.into(), description.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries to render under `policy`, in descriptor order.
    ///
    /// `Full` ignores `live` entirely. `FilterByLive` keeps an entry only if
    /// its name is in `live`; live columns without a description are dropped.
    pub fn select<'a>(
        &'a self,
        live: &LiveColumns,
        policy: ColumnPolicy,
    ) -> Vec<(&'a str, &'a str)> {
        match policy {
            ColumnPolicy::Full => self.iter().collect(),
            ColumnPolicy::FilterByLive => self
                .iter()
                .filter(|(name, _)| live.contains(name))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnDescriptor
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A table to describe to the assistant, loaded from YAML or built in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    /// Unique profile identifier
    pub id: String,

    /// `database.schema.table`
    #[serde(rename = "tableName")]
    pub table_name: QualifiedTableName,

    /// Free-text description of the table
    pub description: String,

    /// Sentence introducing the column list
    #[serde(rename = "columnsHeading", default = "default_columns_heading")]
    pub columns_heading: String,

    /// Column name -> description, in render order
    pub columns: ColumnDescriptor,

    /// Instruction template override; must contain `{{context}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

fn default_columns_heading() -> String {
    DEFAULT_COLUMNS_HEADING.to_string()
}

/// Final prompt handed to the language model, or the no-data marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPrompt {
    /// Rendered instruction template
    Ready(String),

    /// The live fetch yielded no rows; renders as [`NO_DATA_SENTINEL`]
    Unavailable,
}

impl SystemPrompt {
    pub fn is_ready(&self) -> bool {
        matches!(self, SystemPrompt::Ready(_))
    }

    pub fn as_text(&self) -> &str {
        match self {
            SystemPrompt::Ready(text) => text,
            SystemPrompt::Unavailable => NO_DATA_SENTINEL,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            SystemPrompt::Ready(text) => text,
            SystemPrompt::Unavailable => NO_DATA_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for SystemPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}
