//! Configuration types for loading and converting models.
//!
//! All types implement [`serde::Deserialize`] so they can be read from a
//! TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining both sections.
//! - [`ParseConfig`] - Controls how documents are loaded.
//! - [`ConvertConfig`] - Controls how definitions are lowered.
//!
//! # Example
//!
//! ```
//! # use threedo::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.parse().allow_duplicates());
//! assert_eq!(config.convert().scale(), 1.0);
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Document loading section.
    #[serde(default)]
    parse: ParseConfig,

    /// Conversion section.
    #[serde(default)]
    convert: ConvertConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(parse: ParseConfig, convert: ConvertConfig) -> Self {
        Self { parse, convert }
    }

    pub fn parse(&self) -> &ParseConfig {
        &self.parse
    }

    pub fn convert(&self) -> &ConvertConfig {
        &self.convert
    }
}

/// Document loading options.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ParseConfig {
    /// Let a later definition replace an earlier one with the same name.
    #[serde(default)]
    allow_duplicates: bool,
}

impl ParseConfig {
    pub fn new(allow_duplicates: bool) -> Self {
        Self { allow_duplicates }
    }

    pub fn allow_duplicates(&self) -> bool {
        self.allow_duplicates
    }
}

/// Conversion options.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    /// Factor applied to coordinates and switch distances.
    #[serde(default = "default_scale")]
    scale: f64,
}

impl ConvertConfig {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

fn default_scale() -> f64 {
    1.0
}
