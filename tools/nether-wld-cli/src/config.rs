//! nether-wld.toml configuration
//!
//! Every field is optional. Command-line flags override what the file sets.

use anyhow::{Context, Result};
use nether_wld::ReadOptions;
use serde::Deserialize;
use std::path::Path;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "nether-wld.toml";

/// nether-wld.toml structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Container read tolerance
    #[serde(default)]
    pub read: ReadOptions,
    #[serde(default)]
    pub output: OutputSection,
}

/// Output formatting section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Indent JSON output.
    /// Default: true
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

fn default_pretty_json() -> bool {
    true
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty_json: default_pretty_json(),
        }
    }
}

impl CliConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse nether-wld.toml")
    }

    /// Load `explicit` if given, else `nether-wld.toml` in `dir` if present,
    /// else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!("Using config {}", fallback.display());
            Self::load(&fallback)
        } else {
            Ok(Self::default())
        }
    }
}
