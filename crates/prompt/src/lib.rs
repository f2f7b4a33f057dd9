//! Prompt system for Frosty.
//!
//! This crate assembles the system prompt for the SQL assistant:
//! - Ordered column descriptors and YAML table profiles
//! - Table context rendering under a column policy
//! - Handlebars instruction template rendering
//! - A process-scoped context cache
//! - The `ColumnSource` seam that live schema providers implement

pub mod assembler;
pub mod builder;
pub mod cache;
pub mod column_source;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use assembler::PromptAssembler;
pub use builder::{
    build_system_prompt, build_system_prompt_from_rows, build_table_context, header_columns,
    render_system_prompt,
};
pub use cache::{ContextCache, ContextKey};
pub use column_source::{ColumnSource, StaticSource};
pub use loader::{list_profiles, load_profile};
pub use types::{ColumnDescriptor, SystemPrompt, TableProfile, NO_DATA_SENTINEL};
