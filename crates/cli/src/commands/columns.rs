//! Columns command handler.
//!
//! Shows what the configured source reports for the profile's table and
//! how it lines up with the profile's column descriptor.

use clap::Args;
use frosty_core::{config::AppConfig, AppResult};
use frosty_prompt::load_profile;
use frosty_source::create_source;

/// Show the live column set of the configured source
#[derive(Args, Debug)]
pub struct ColumnsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ColumnsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing columns command");

        config.validate()?;

        let profile = load_profile(&config.workspace, &config.profile)?;
        let source = create_source(config)?;
        let live = source.live_columns(&profile.table_name).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&live)?);
            return Ok(());
        }

        println!(
            "{} columns for {} from {}:",
            live.len(),
            profile.table_name,
            source.source_name()
        );
        for column in live.columns() {
            let described = if profile.columns.get(&column.name).is_some() {
                "described"
            } else {
                "no description"
            };
            println!(
                "  {:<24} {:<16} {}",
                column.name,
                column.data_type.as_deref().unwrap_or("-"),
                described
            );
        }

        let missing: Vec<&str> = profile
            .columns
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !live.contains(name))
            .collect();
        if !live.is_empty() && !missing.is_empty() {
            println!("Described but not in source: {}", missing.join(", "));
        }

        Ok(())
    }
}
