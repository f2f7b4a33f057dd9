//! Profile loader for YAML table profiles.

use crate::defaults::nba_profile;
use crate::types::TableProfile;
use frosty_core::{config::DEFAULT_PROFILE, AppError, AppResult};
use std::path::{Path, PathBuf};

/// Directory holding workspace profiles.
pub fn profiles_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".frosty/profiles")
}

/// Load a table profile by ID.
///
/// Looks for `<id>.yml` in `.frosty/profiles/`. A workspace file shadows the
/// built-in profile of the same id.
///
/// # Example
/// ```no_run
/// use frosty_prompt::load_profile;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let profile = load_profile(Path::new("."), "frosty.nba.per_game_stats")?;
/// println!("Loaded profile for {}", profile.table_name);
/// # Ok(())
/// # }
/// ```
pub fn load_profile(workspace_path: &Path, profile_id: &str) -> AppResult<TableProfile> {
    let profile_file = profiles_dir(workspace_path).join(format!("{}.yml", profile_id));

    if !profile_file.exists() {
        if profile_id == DEFAULT_PROFILE {
            tracing::debug!("Using built-in profile {}", profile_id);
            return nba_profile();
        }

        return Err(AppError::Prompt(format!(
            "Profile file not found: {:?}",
            profile_file
        )));
    }

    tracing::debug!("Loading profile from: {:?}", profile_file);

    let contents = std::fs::read_to_string(&profile_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read profile file {:?}: {}",
            profile_file, e
        ))
    })?;

    let profile: TableProfile = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse profile YAML {:?}: {}",
            profile_file, e
        ))
    })?;

    validate_profile(&profile)?;

    if profile.id != profile_id {
        tracing::warn!(
            "Profile file {:?} declares id '{}'",
            profile_file,
            profile.id
        );
    }

    tracing::info!("Loaded profile: {} ({})", profile.id, profile.table_name);

    Ok(profile)
}

/// List the built-in profile and every `.yml` profile in the workspace, sorted.
pub fn list_profiles(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut profile_ids = vec![DEFAULT_PROFILE.to_string()];
    let dir = profiles_dir(workspace_path);

    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    profile_ids.push(stem.to_string());
                }
            }
        }
    }

    profile_ids.sort();
    profile_ids.dedup();

    Ok(profile_ids)
}

/// Validate a table profile.
fn validate_profile(profile: &TableProfile) -> AppResult<()> {
    if profile.id.trim().is_empty() {
        return Err(AppError::Prompt("Profile id cannot be empty".to_string()));
    }

    if profile.description.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Profile {} has an empty description",
            profile.id
        )));
    }

    if profile.columns.is_empty() {
        return Err(AppError::Prompt(format!(
            "Profile {} defines no columns",
            profile.id
        )));
    }

    if let Some(template) = &profile.template {
        if !template.contains("{{context}}") {
            return Err(AppError::Prompt(format!(
                "Profile {} template is missing the {{{{context}}}} placeholder",
                profile.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_profile(dir: &Path, id: &str, body: &str) -> PathBuf {
        let dir = profiles_dir(dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.yml", id));
        fs::write(&path, body).unwrap();
        path
    }

    fn orders_yaml(id: &str) -> String {
        format!(
            r#"
id: {}
tableName: SALES.PUBLIC.ORDERS
description: One row per customer order.
columnsHeading: "Order columns:"
columns:
  ORDER_ID: Order identifier
  AMOUNT: Order total in USD
"#,
            id
        )
    }

    #[test]
    fn test_builtin_profile_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let profile = load_profile(temp_dir.path(), DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.table_name.to_string(), "FROSTY_SAMPLE.NBA.PER_GAME_STATS");
    }

    #[test]
    fn test_load_workspace_profile() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), "sales.orders", &orders_yaml("sales.orders"));

        let profile = load_profile(temp_dir.path(), "sales.orders").unwrap();
        assert_eq!(profile.columns_heading, "Order columns:");
        assert_eq!(profile.columns.len(), 2);
    }

    #[test]
    fn test_workspace_file_shadows_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), DEFAULT_PROFILE, &orders_yaml(DEFAULT_PROFILE));

        let profile = load_profile(temp_dir.path(), DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.table_name.to_string(), "SALES.PUBLIC.ORDERS");
    }

    #[test]
    fn test_load_nonexistent_profile() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_profile(temp_dir.path(), "nope").is_err());
    }

    #[test]
    fn test_load_invalid_table_name() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(
            temp_dir.path(),
            "bad",
            "id: bad\ntableName: ORDERS\ndescription: x\ncolumns:\n  A: b\n",
        );
        let err = load_profile(temp_dir.path(), "bad").unwrap_err();
        assert!(err.to_string().contains("Invalid table name"));
    }

    #[test]
    fn test_template_requires_context_slot() {
        let temp_dir = TempDir::new().unwrap();
        let body = format!("{}template: \"no slot here\"\n", orders_yaml("t"));
        write_profile(temp_dir.path(), "t", &body);

        let err = load_profile(temp_dir.path(), "t").unwrap_err();
        assert!(err.to_string().contains("{{context}}"));
    }

    #[test]
    fn test_list_profiles() {
        let temp_dir = TempDir::new().unwrap();
        write_profile(temp_dir.path(), "sales.orders", &orders_yaml("sales.orders"));
        write_profile(temp_dir.path(), DEFAULT_PROFILE, &orders_yaml(DEFAULT_PROFILE));
        fs::write(profiles_dir(temp_dir.path()).join("notes.txt"), "x").unwrap();

        let ids = list_profiles(temp_dir.path()).unwrap();
        assert_eq!(ids, vec![DEFAULT_PROFILE.to_string(), "sales.orders".to_string()]);
    }
}
