//! Live column sources for Frosty.
//!
//! Implementations of `frosty_prompt::ColumnSource`:
//! - **Warehouse**: Snowflake information-schema query over the SQL API
//! - **SQLite**: local schema introspection
//! - **Sheets**: header row of a Google Sheets range, with OAuth credentials
//!
//! # Example
//! ```no_run
//! use frosty_core::AppConfig;
//! use frosty_prompt::{load_profile, PromptAssembler};
//! use frosty_source::create_source;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let profile = load_profile(&config.workspace, &config.profile)?;
//! let source = create_source(&config)?;
//! let prompt = PromptAssembler::new(source.as_ref())
//!     .system_prompt(&profile, config.effective_policy())
//!     .await?;
//! println!("{}", prompt);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod factory;
pub mod sheets;
pub mod sqlite;
pub mod warehouse;

// Re-export main types
pub use auth::{CredentialManager, StoredToken, TokenState};
pub use factory::{create_source, credentials, uses_context_cache};
pub use sheets::{SheetsClient, SheetsSource};
pub use sqlite::SqliteSource;
pub use warehouse::{information_schema_query, SnowflakeSource};
