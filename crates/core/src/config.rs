//! Configuration management for Frosty.
//!
//! Configuration is merged from, in increasing precedence:
//! - Built-in defaults
//! - The config file (`.frosty/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: profiles, credentials, and the
//! config file all live under `.frosty/`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::schema::ColumnPolicy;

/// Profile rendered when nothing else is selected.
pub const DEFAULT_PROFILE: &str = "frosty.nba.per_game_stats";

/// Where the live column set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// No fetch; the descriptor is used as-is.
    Static,
    /// Snowflake information-schema query.
    Warehouse,
    /// Local SQLite schema introspection.
    Sqlite,
    /// Header row of a Google Sheets range.
    Sheets,
}

impl SourceKind {
    /// Column policy used when none is configured explicitly.
    pub fn default_policy(&self) -> ColumnPolicy {
        match self {
            SourceKind::Sheets => ColumnPolicy::FilterByLive,
            SourceKind::Static | SourceKind::Warehouse | SourceKind::Sqlite => ColumnPolicy::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Static => "static",
            SourceKind::Warehouse => "warehouse",
            SourceKind::Sqlite => "sqlite",
            SourceKind::Sheets => "sheets",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(SourceKind::Static),
            "warehouse" | "snowflake" => Ok(SourceKind::Warehouse),
            "sqlite" => Ok(SourceKind::Sqlite),
            "sheets" | "spreadsheet" => Ok(SourceKind::Sheets),
            other => Err(AppError::Config(format!(
                "Unknown source: {}. Supported: static, warehouse, sqlite, sheets",
                other
            ))),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .frosty/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Table profile id to render
    pub profile: String,

    /// Column source
    pub source: SourceKind,

    /// Explicit column policy; `None` means the source's default
    pub policy: Option<ColumnPolicy>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Per-source connection settings
    pub sources: SourcesConfig,
}

/// Per-source settings from config.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,

    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,

    #[serde(default)]
    pub sheets: Option<SheetsConfig>,
}

/// Snowflake SQL API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Account identifier (the `<account>` in `<account>.snowflakecomputing.com`)
    pub account: String,

    /// Environment variable holding the bearer token
    #[serde(rename = "tokenEnv", default = "default_token_env")]
    pub token_env: String,

    /// Token type header value ("OAUTH" or "KEYPAIR_JWT")
    #[serde(rename = "tokenType", default = "default_token_type")]
    pub token_type: String,

    /// Override the API base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub warehouse: Option<String>,

    #[serde(default)]
    pub role: Option<String>,

    /// Statement timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    /// Memoize the rendered context for the process lifetime
    #[serde(default = "default_true")]
    pub cache: bool,
}

fn default_token_env() -> String {
    "SNOWFLAKE_TOKEN".to_string()
}

fn default_token_type() -> String {
    "OAUTH".to_string()
}

fn default_true() -> bool {
    true
}

/// Local SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file; relative paths resolve against the workspace
    pub path: PathBuf,
}

/// Google Sheets settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: String,

    /// A1 range whose first row is the header
    #[serde(default = "default_sheet_range")]
    pub range: String,

    /// OAuth client secret ("installed app" JSON)
    #[serde(rename = "clientSecretPath", default = "default_client_secret_path")]
    pub client_secret_path: PathBuf,

    /// Where the access/refresh token is persisted
    #[serde(rename = "tokenPath", default = "default_token_path")]
    pub token_path: PathBuf,
}

fn default_sheet_range() -> String {
    "Sheet1!A1:AC".to_string()
}

fn default_client_secret_path() -> PathBuf {
    PathBuf::from(".frosty/client_secret.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".frosty/sheets_token.json")
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    prompt: Option<PromptSection>,
    #[serde(default)]
    sources: Option<SourcesConfig>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptSection {
    profile: Option<String>,
    source: Option<SourceKind>,
    policy: Option<ColumnPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            profile: DEFAULT_PROFILE.to_string(),
            source: SourceKind::Static,
            policy: None,
            log_level: None,
            verbose: false,
            no_color: false,
            sources: SourcesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file, and defaults.
    ///
    /// Environment variables:
    /// - `FROSTY_WORKSPACE`: Override workspace path
    /// - `FROSTY_CONFIG`: Path to config file
    /// - `FROSTY_PROFILE`: Table profile id
    /// - `FROSTY_SOURCE`: Column source (static, warehouse, sqlite, sheets)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use frosty_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Source: {}", config.source);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Both arguments win over `FROSTY_WORKSPACE` / `FROSTY_CONFIG`. An
    /// explicit config file that does not exist is an error.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        } else if let Ok(workspace) = std::env::var("FROSTY_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Some(config_file) = config_file {
            config.config_file = Some(config_file);
        } else if let Ok(config_file) = std::env::var("FROSTY_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.frosty_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(profile) = std::env::var("FROSTY_PROFILE") {
            config.profile = profile;
        }

        if let Ok(source) = std::env::var("FROSTY_SOURCE") {
            config.source = source.parse()?;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(prompt) = config_file.prompt {
            if let Some(profile) = prompt.profile {
                result.profile = profile;
            }
            if let Some(source) = prompt.source {
                result.source = source;
            }
            if prompt.policy.is_some() {
                result.policy = prompt.policy;
            }
        }

        if let Some(sources) = config_file.sources {
            result.sources = sources;
        }

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        profile: Option<String>,
        source: Option<SourceKind>,
        policy: Option<ColumnPolicy>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(profile) = profile {
            self.profile = profile;
        }

        if let Some(source) = source {
            self.source = source;
        }

        if policy.is_some() {
            self.policy = policy;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .frosty directory.
    pub fn frosty_dir(&self) -> PathBuf {
        self.workspace.join(".frosty")
    }

    /// Resolve a configured path against the workspace root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Column policy in effect: the explicit one, else the source default.
    pub fn effective_policy(&self) -> ColumnPolicy {
        self.policy.unwrap_or_else(|| self.source.default_policy())
    }

    /// Resolve the warehouse bearer token from its environment variable.
    pub fn resolve_warehouse_token(&self) -> AppResult<String> {
        let warehouse = self.warehouse()?;
        std::env::var(&warehouse.token_env).map_err(|_| {
            AppError::Config(format!(
                "Warehouse token not found in environment variable: {}",
                warehouse.token_env
            ))
        })
    }

    pub fn warehouse(&self) -> AppResult<&WarehouseConfig> {
        self.sources
            .warehouse
            .as_ref()
            .ok_or_else(|| missing_section("warehouse"))
    }

    pub fn sqlite(&self) -> AppResult<&SqliteConfig> {
        self.sources
            .sqlite
            .as_ref()
            .ok_or_else(|| missing_section("sqlite"))
    }

    pub fn sheets(&self) -> AppResult<&SheetsConfig> {
        self.sources
            .sheets
            .as_ref()
            .ok_or_else(|| missing_section("sheets"))
    }

    /// Validate configuration for the selected source.
    pub fn validate(&self) -> AppResult<()> {
        if self.profile.trim().is_empty() {
            return Err(AppError::Config("Profile id cannot be empty".to_string()));
        }

        match self.source {
            SourceKind::Static => {}
            SourceKind::Warehouse => {
                let warehouse = self.warehouse()?;
                if warehouse.account.trim().is_empty() {
                    return Err(AppError::Config(
                        "Warehouse account cannot be empty".to_string(),
                    ));
                }
                self.resolve_warehouse_token()?;
            }
            SourceKind::Sqlite => {
                let path = self.resolve_path(&self.sqlite()?.path);
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "SQLite database not found: {:?}",
                        path
                    )));
                }
            }
            SourceKind::Sheets => {
                let sheets = self.sheets()?;
                if sheets.spreadsheet_id.trim().is_empty() {
                    return Err(AppError::Config(
                        "Spreadsheet id cannot be empty".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

fn missing_section(name: &str) -> AppError {
    AppError::Config(format!(
        "Source '{}' selected but sources.{} is missing from config.yaml",
        name, name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, yaml: &str) -> PathBuf {
        let path = dir.join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.source, SourceKind::Static);
        assert_eq!(config.effective_policy(), ColumnPolicy::Full);
        assert!(!config.verbose);
    }

    #[test]
    fn test_frosty_dir() {
        let config = AppConfig::default();
        assert!(config.frosty_dir().ends_with(".frosty"));
    }

    #[test]
    fn test_default_policy_per_source() {
        assert_eq!(SourceKind::Warehouse.default_policy(), ColumnPolicy::Full);
        assert_eq!(SourceKind::Sqlite.default_policy(), ColumnPolicy::Full);
        assert_eq!(
            SourceKind::Sheets.default_policy(),
            ColumnPolicy::FilterByLive
        );
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            None,
            None,
            Some("sales.orders".to_string()),
            Some(SourceKind::Sheets),
            Some(ColumnPolicy::Full),
            None,
            true,
            false,
        );

        assert_eq!(config.profile, "sales.orders");
        assert_eq!(config.source, SourceKind::Sheets);
        assert_eq!(config.effective_policy(), ColumnPolicy::Full);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"
prompt:
  profile: custom.table
  source: sheets
sources:
  sheets:
    spreadsheetId: abc123
  warehouse:
    account: xy12345
    warehouse: COMPUTE_WH
logging:
  level: info
  color: false
"#,
        );

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.profile, "custom.table");
        assert_eq!(config.source, SourceKind::Sheets);
        assert_eq!(config.effective_policy(), ColumnPolicy::FilterByLive);
        assert!(config.no_color);

        let sheets = config.sheets().unwrap();
        assert_eq!(sheets.spreadsheet_id, "abc123");
        assert_eq!(sheets.range, "Sheet1!A1:AC");
        assert_eq!(sheets.token_path, PathBuf::from(".frosty/sheets_token.json"));

        let warehouse = config.warehouse().unwrap();
        assert_eq!(warehouse.token_env, "SNOWFLAKE_TOKEN");
        assert!(warehouse.cache);
    }

    #[test]
    fn test_load_with_explicit_config_file() {
        let workspace = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let path = other.path().join("other.yaml");
        std::fs::write(
            &path,
            r#"
sources:
  sqlite:
    path: stats.db
"#,
        )
        .unwrap();

        let config =
            AppConfig::load_with(Some(workspace.path().to_path_buf()), Some(path.clone()))
                .unwrap()
                .with_overrides(
                    None,
                    None,
                    None,
                    Some(SourceKind::Sqlite),
                    None,
                    None,
                    false,
                    false,
                );

        assert_eq!(config.workspace, workspace.path());
        assert_eq!(config.config_file, Some(path));
        assert_eq!(config.sqlite().unwrap().path, PathBuf::from("stats.db"));
    }

    #[test]
    fn test_load_with_workspace_config() {
        let workspace = TempDir::new().unwrap();
        let frosty_dir = workspace.path().join(".frosty");
        std::fs::create_dir_all(&frosty_dir).unwrap();
        write_config(
            &frosty_dir,
            r#"
sources:
  sheets:
    spreadsheetId: abc123
"#,
        );

        let config = AppConfig::load_with(Some(workspace.path().to_path_buf()), None).unwrap();
        assert_eq!(config.sheets().unwrap().spreadsheet_id, "abc123");
    }

    #[test]
    fn test_load_with_missing_config_file() {
        let workspace = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            Some(workspace.path().to_path_buf()),
            Some(workspace.path().join("absent.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_yaml_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "prompt: [unclosed");
        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_validate_missing_section() {
        let mut config = AppConfig::default();
        config.source = SourceKind::Warehouse;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sources.warehouse"));
    }

    #[test]
    fn test_validate_sqlite_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = AppConfig {
            workspace: temp_dir.path().to_path_buf(),
            source: SourceKind::Sqlite,
            ..AppConfig::default()
        };
        config.sources.sqlite = Some(SqliteConfig {
            path: PathBuf::from("stats.db"),
        });
        assert!(config.validate().is_err());

        std::fs::write(temp_dir.path().join("stats.db"), b"").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_kind_parse() {
        assert_eq!("Snowflake".parse::<SourceKind>().unwrap(), SourceKind::Warehouse);
        assert!("postgres".parse::<SourceKind>().is_err());
    }
}
