//! Frosty Core Library
//!
//! This crate provides the foundational utilities for the Frosty prompt builder:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Shared schema types (`QualifiedTableName`, `LiveColumns`, `ColumnPolicy`)

pub mod config;
pub mod error;
pub mod logging;
pub mod schema;

// Re-export commonly used types
pub use config::{AppConfig, SourceKind};
pub use error::{AppError, AppResult};
pub use schema::{ColumnInfo, ColumnPolicy, LiveColumns, QualifiedTableName};
