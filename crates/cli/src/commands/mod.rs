//! Command handlers for the Frosty CLI.

pub mod auth;
pub mod columns;
pub mod profiles;
pub mod prompt;

// Re-export command types for convenience
pub use auth::AuthCommand;
pub use columns::ColumnsCommand;
pub use profiles::ProfilesCommand;
pub use prompt::PromptCommand;
