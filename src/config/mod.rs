//! Configuration module for Exchange-Export
//!
//! This module handles loading, parsing, and validating the TOML
//! configuration, with environment variables layered on top.
//!
//! # Example
//!
//! ```no_run
//! use exchange_export::config::load_effective_config;
//! use std::path::Path;
//!
//! let (config, _hash) = load_effective_config(Some(Path::new("export.toml"))).unwrap();
//! println!("Exporting to: {}", config.export.output_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ExchangeConfig, ExportConfig, ImageNaming};

// Re-export parser functions
pub use parser::{apply_env_overrides, compute_config_hash, load_config, load_effective_config};
pub use validation::validate;
