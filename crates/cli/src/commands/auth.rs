//! Auth command handler.
//!
//! Drives the spreadsheet credential state machine from the terminal.

use clap::Args;
use frosty_core::{config::AppConfig, AppResult};
use frosty_source::{credentials, TokenState};

/// Authorize spreadsheet access and report the token state
#[derive(Args, Debug)]
pub struct AuthCommand {
    /// Only report the current token state; never refresh or authorize
    #[arg(long)]
    pub status: bool,

    /// Discard any saved token and authorize again
    #[arg(long, conflicts_with = "status")]
    pub force: bool,
}

impl AuthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing auth command");

        let manager = credentials(config)?;
        let state = manager.state()?;

        if self.status {
            match &state {
                TokenState::NoToken => println!("Token state: {}", state.name()),
                TokenState::Valid(token) | TokenState::Expired(token) => println!(
                    "Token state: {} (expires {})",
                    state.name(),
                    token.expiry.to_rfc3339()
                ),
            }
            return Ok(());
        }

        let token = if self.force {
            manager.interactive_authorize().await?
        } else {
            manager.ensure_valid().await?
        };

        println!(
            "Token state: valid (expires {}), saved to {}",
            token.expiry.to_rfc3339(),
            manager.token_path().display()
        );

        Ok(())
    }
}
