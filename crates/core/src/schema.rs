//! Shared schema types: qualified table names and live column sets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// A `database.schema.table` identifier.
///
/// The parts keep the casing they were written with; callers that talk to
/// case-folding catalogs (e.g. Snowflake's information schema) upper-case
/// them at query time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedTableName {
    database: String,
    schema: String,
    table: String,
}

impl QualifiedTableName {
    /// Parse a dot-separated, three-part table name.
    ///
    /// Fails with [`AppError::InvalidTableName`] unless there are exactly
    /// three non-empty parts.
    ///
    /// # Example
    /// ```
    /// use frosty_core::QualifiedTableName;
    ///
    /// let name = QualifiedTableName::parse("FROSTY_SAMPLE.NBA.PER_GAME_STATS").unwrap();
    /// assert_eq!(name.schema(), "NBA");
    /// ```
    pub fn parse(name: &str) -> AppResult<Self> {
        let parts: Vec<&str> = name.split('.').map(str::trim).collect();

        if parts.len() != 3 {
            return Err(AppError::InvalidTableName {
                name: name.to_string(),
                reason: format!(
                    "expected 3 dot-separated parts (database.schema.table), found {}",
                    parts.len()
                ),
            });
        }

        if let Some(pos) = parts.iter().position(|p| p.is_empty()) {
            return Err(AppError::InvalidTableName {
                name: name.to_string(),
                reason: format!("part {} is empty", pos + 1),
            });
        }

        Ok(Self {
            database: parts[0].to_string(),
            schema: parts[1].to_string(),
            table: parts[2].to_string(),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for QualifiedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl FromStr for QualifiedTableName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedTableName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QualifiedTableName> for String {
    fn from(value: QualifiedTableName) -> Self {
        value.to_string()
    }
}

/// A column reported by a live data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as the source reports it
    pub name: String,

    /// Source data type, when the source exposes one
    #[serde(rename = "dataType", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }

    pub fn with_type(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type.into()),
        }
    }
}

/// Ordered set of columns fetched from a data source at prompt-build time.
///
/// Read only once constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveColumns {
    columns: Vec<ColumnInfo>,
}

impl LiveColumns {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    /// Build a live set from a header row (column names only).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(ColumnInfo::new).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// How a column descriptor is reconciled with the live column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnPolicy {
    /// Render every descriptor entry; the live set is ignored.
    Full,

    /// Render only descriptor entries whose name is in the live set.
    FilterByLive,
}

impl ColumnPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnPolicy::Full => "full",
            ColumnPolicy::FilterByLive => "filter-by-live",
        }
    }
}

impl fmt::Display for ColumnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(ColumnPolicy::Full),
            "filter-by-live" | "filter" => Ok(ColumnPolicy::FilterByLive),
            other => Err(AppError::Config(format!(
                "Unknown column policy: {}. Supported: full, filter-by-live",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_parts() {
        let name = QualifiedTableName::parse("FROSTY_SAMPLE.NBA.PER_GAME_STATS").unwrap();
        assert_eq!(name.database(), "FROSTY_SAMPLE");
        assert_eq!(name.schema(), "NBA");
        assert_eq!(name.table(), "PER_GAME_STATS");
        assert_eq!(name.to_string(), "FROSTY_SAMPLE.NBA.PER_GAME_STATS");
    }

    #[test]
    fn test_parse_keeps_casing() {
        let name = QualifiedTableName::parse("frosty.nba.stats").unwrap();
        assert_eq!(name.to_string(), "frosty.nba.stats");
    }

    #[test]
    fn test_parse_rejects_two_parts() {
        let err = QualifiedTableName::parse("NBA.PER_GAME_STATS").unwrap_err();
        assert!(matches!(err, AppError::InvalidTableName { .. }));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_parse_rejects_four_parts() {
        assert!(QualifiedTableName::parse("a.b.c.d").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_part() {
        let err = QualifiedTableName::parse("a..c").unwrap_err();
        assert!(err.to_string().contains("part 2 is empty"));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: QualifiedTableName = serde_yaml::from_str("\"DB.S.T\"").unwrap();
        assert_eq!(ok.table(), "T");

        let bad: Result<QualifiedTableName, _> = serde_yaml::from_str("\"DB.T\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_live_columns_lookup() {
        let live = LiveColumns::from_names(["PLAYER", "PTS"]);
        assert!(live.contains("PLAYER"));
        assert!(!live.contains("AST"));
        assert_eq!(live.names().collect::<Vec<_>>(), vec!["PLAYER", "PTS"]);
        assert_eq!(live.len(), 2);
    }

    #[test]
    fn test_column_policy_parse() {
        assert_eq!("full".parse::<ColumnPolicy>().unwrap(), ColumnPolicy::Full);
        assert_eq!(
            "Filter-By-Live".parse::<ColumnPolicy>().unwrap(),
            ColumnPolicy::FilterByLive
        );
        assert!("strict".parse::<ColumnPolicy>().is_err());
    }
}
