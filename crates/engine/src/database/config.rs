//! Database configuration via `strata.toml`
//!
//! On first open a default `strata.toml` is created in the data directory.
//! To change settings, edit the file and reopen the database.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_core::{StrataError, StrataResult};
use strata_storage::DurabilityMode;

/// Config file name placed in the database data directory.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Vector engine settings, the `[vector]` section of `strata.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorSettings {
    /// Results per query vector when the caller does not say (default: 10)
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    /// Candidate count above which query scoring runs on the rayon pool
    /// (default: 4096)
    #[serde(default = "default_parallel_scan_threshold")]
    pub parallel_scan_threshold: usize,
}

fn default_top_n() -> usize {
    10
}

fn default_parallel_scan_threshold() -> usize {
    4096
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            default_top_n: default_top_n(),
            parallel_scan_threshold: default_parallel_scan_threshold(),
        }
    }
}

/// Database configuration loaded from `strata.toml`.
///
/// # Example
///
/// ```toml
/// # Durability mode: "standard" (default) or "always"
/// durability = "standard"
///
/// [vector]
/// default_top_n = 10
/// parallel_scan_threshold = 4096
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrataConfig {
    /// Durability mode: `"standard"` or `"always"`.
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Vector engine settings.
    #[serde(default)]
    pub vector: VectorSettings,
}

fn default_durability_str() -> String {
    "standard".to_string()
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            vector: VectorSettings::default(),
        }
    }
}

impl StrataConfig {
    /// Config with `durability = "always"`.
    pub fn always() -> Self {
        Self {
            durability: "always".to_string(),
            ..Self::default()
        }
    }

    /// Parse the durability string into a `DurabilityMode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"standard"` or `"always"`.
    pub fn durability_mode(&self) -> StrataResult<DurabilityMode> {
        match self.durability.as_str() {
            "standard" => Ok(DurabilityMode::standard_default()),
            "always" => Ok(DurabilityMode::Always),
            other => Err(StrataError::invalid_input(format!(
                "Invalid durability mode '{}' in strata.toml. Expected \"standard\" or \"always\".",
                other
            ))),
        }
    }

    /// Check every value, not just the ones serde can type-check.
    pub fn validate(&self) -> StrataResult<()> {
        self.durability_mode()?;
        if self.vector.default_top_n == 0 {
            return Err(StrataError::invalid_input(
                "vector.default_top_n in strata.toml must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata vector database configuration
#
# Durability mode: "standard" (default) or "always"
#   "standard" = periodic fsync (~100ms), may lose last interval on crash
#   "always"   = fsync every write, zero data loss
durability = "standard"

[vector]
# Results per query vector when the caller does not pass top_n.
default_top_n = 10

# Queries with more candidates than this score them on a thread pool.
parallel_scan_threshold = 4096
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn from_file(path: &Path) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrataError::internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: StrataConfig = toml::from_str(&content).map_err(|e| {
            StrataError::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> StrataResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StrataError::internal(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StrataResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StrataError::internal(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StrataError::internal(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
