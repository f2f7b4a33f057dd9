//! Prompt builder: renders table context and the instruction template.

use crate::defaults::GEN_SQL;
use crate::types::{SystemPrompt, TableProfile};
use frosty_core::{AppError, AppResult, ColumnPolicy, LiveColumns};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Layout of the table context block.
const CONTEXT_TEMPLATE: &str = "Here is the table name <tableName> {{tableName}} </tableName>

<tableDescription>{{tableDescription}}</tableDescription>

{{columnsHeading}}

<columns>
{{columns}}
</columns>";

/// Render the table context for `profile`.
///
/// The column list contains one `- **NAME**: description` line per entry
/// selected by `policy`, in descriptor order.
///
/// # Example
/// ```
/// use frosty_core::{ColumnPolicy, LiveColumns};
/// use frosty_prompt::{build_table_context, defaults::nba_profile};
///
/// let profile = nba_profile().unwrap();
/// let context = build_table_context(&profile, &LiveColumns::default(), ColumnPolicy::Full).unwrap();
/// assert!(context.contains("<tableName> FROSTY_SAMPLE.NBA.PER_GAME_STATS </tableName>"));
/// assert!(context.contains("- **PLAYER**: The player name"));
/// ```
pub fn build_table_context(
    profile: &TableProfile,
    live: &LiveColumns,
    policy: ColumnPolicy,
) -> AppResult<String> {
    let selected = profile.columns.select(live, policy);

    tracing::debug!(
        "Rendering context for {} with {} of {} columns ({})",
        profile.table_name,
        selected.len(),
        profile.columns.len(),
        policy
    );

    let columns = selected
        .iter()
        .map(|(name, description)| format!("- **{}**: {}", name, description))
        .collect::<Vec<_>>()
        .join("\n");

    let mut variables = HashMap::new();
    variables.insert("tableName".to_string(), profile.table_name.to_string());
    variables.insert("tableDescription".to_string(), profile.description.clone());
    variables.insert("columnsHeading".to_string(), profile.columns_heading.clone());
    variables.insert("columns".to_string(), columns);

    render_template(CONTEXT_TEMPLATE, &variables)
}

/// Substitute an already rendered context into the profile's instruction template.
pub fn render_system_prompt(profile: &TableProfile, context: &str) -> AppResult<String> {
    let template = profile.template.as_deref().unwrap_or(GEN_SQL);

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());

    render_template(template, &variables)
}

/// Build the system prompt from a live column set.
///
/// Under `FilterByLive` an empty live set means the upstream fetch returned
/// no rows, and the result is [`SystemPrompt::Unavailable`].
pub fn build_system_prompt(
    profile: &TableProfile,
    live: &LiveColumns,
    policy: ColumnPolicy,
) -> AppResult<SystemPrompt> {
    if policy == ColumnPolicy::FilterByLive && live.is_empty() {
        tracing::warn!(
            "No live columns for {}; returning no-data marker",
            profile.table_name
        );
        return Ok(SystemPrompt::Unavailable);
    }

    let context = build_table_context(profile, live, policy)?;
    let prompt = render_system_prompt(profile, &context)?;

    tracing::debug!("Built system prompt ({} bytes)", prompt.len());

    Ok(SystemPrompt::Ready(prompt))
}

/// Build the system prompt from spreadsheet rows fetched by the caller.
///
/// The first row is the header; only descriptor columns named in it are
/// rendered. No rows yields [`SystemPrompt::Unavailable`].
pub fn build_system_prompt_from_rows(
    profile: &TableProfile,
    rows: &[Vec<String>],
) -> AppResult<SystemPrompt> {
    build_system_prompt(profile, &header_columns(rows), ColumnPolicy::FilterByLive)
}

/// Header row of `rows` as a live column set; blank cells are skipped.
pub fn header_columns(rows: &[Vec<String>]) -> LiveColumns {
    rows.first()
        .map(|header| {
            LiveColumns::from_names(
                header
                    .iter()
                    .map(|h| h.trim())
                    .filter(|h| !h.is_empty())
                    .map(str::to_string),
            )
        })
        .unwrap_or_default()
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
