//! Profiles command handler.

use clap::Args;
use frosty_core::{config::AppConfig, AppResult};
use frosty_prompt::{list_profiles, load_profile};

/// List available table profiles
#[derive(Args, Debug)]
pub struct ProfilesCommand {
    /// Show table name and column count for each profile
    #[arg(short, long)]
    pub detailed: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProfilesCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing profiles command");

        let ids = list_profiles(&config.workspace)?;

        if self.json {
            let mut entries = Vec::with_capacity(ids.len());
            for id in &ids {
                let profile = load_profile(&config.workspace, id)?;
                entries.push(serde_json::json!({
                    "id": id,
                    "tableName": profile.table_name.to_string(),
                    "columns": profile.columns.len(),
                    "active": *id == config.profile,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
            return Ok(());
        }

        for id in &ids {
            let marker = if *id == config.profile { "*" } else { " " };
            if self.detailed {
                let profile = load_profile(&config.workspace, id)?;
                println!(
                    "{} {}  {}  ({} columns)",
                    marker,
                    id,
                    profile.table_name,
                    profile.columns.len()
                );
            } else {
                println!("{} {}", marker, id);
            }
        }

        Ok(())
    }
}
