//! Shared types, error model, and configuration for plugindocs.
//!
//! This crate is the foundation depended on by all other plugindocs crates.
//! It provides:
//! - [`DocsBuildError`] — the unified error type
//! - Domain types ([`PluginIdentity`], [`RawRecord`], [`NormalizedRecord`])
//! - The per-plugin diagnostics map ([`PluginErrors`])
//! - The dependency descriptor ([`DependencyFile`]) and app configuration

pub mod config;
pub mod deps;
pub mod error;
pub mod plugin_errors;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, RegistryConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use deps::DependencyFile;
pub use error::{DocsBuildError, Result};
pub use plugin_errors::PluginErrors;
pub use types::{
    BASE_ARTIFACT_NAME, NormalizedRecord, NormalizedRecordMap, OptionDoc, PluginDocs,
    PluginIdentity, RawRecord, RawRecordMap, ReturnDoc,
};
