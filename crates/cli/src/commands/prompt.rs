//! Prompt command handler.
//!
//! Loads the table profile, resolves it against the configured column
//! source, and prints the system prompt to stdout.

use clap::Args;
use frosty_core::{config::AppConfig, AppResult};
use frosty_prompt::{load_profile, ContextCache, PromptAssembler, NO_DATA_SENTINEL};
use frosty_source::{create_source, uses_context_cache};

/// Print the system prompt
#[derive(Args, Debug)]
pub struct PromptCommand {
    /// Print only the rendered table context, not the full instructions
    #[arg(long)]
    pub context_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptCommand {
    /// Execute the prompt command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompt command");
        tracing::debug!("Prompt options: {:?}", self);

        config.validate()?;

        let profile = load_profile(&config.workspace, &config.profile)?;
        let source = create_source(config)?;
        let policy = config.effective_policy();

        let mut assembler = PromptAssembler::new(source.as_ref());
        if uses_context_cache(config) {
            assembler = assembler.with_cache(ContextCache::global());
        }

        let (text, ready) = if self.context_only {
            match assembler.table_context(&profile, policy).await? {
                Some(context) => (context, true),
                None => (NO_DATA_SENTINEL.to_string(), false),
            }
        } else {
            let prompt = assembler.system_prompt(&profile, policy).await?;
            let ready = prompt.is_ready();
            (prompt.into_text(), ready)
        };

        if !ready {
            tracing::warn!("{} returned no data for {}", source.source_name(), profile.id);
        }

        if self.json {
            let output = serde_json::json!({
                "profile": profile.id,
                "tableName": profile.table_name.to_string(),
                "source": source.source_name(),
                "policy": policy.as_str(),
                "ready": ready,
                "prompt": text,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", text);
        }

        Ok(())
    }
}
