//! TOML configuration for the `hcl` CLI.
//!
//! Lookup order: `--config <path>`, then `hcl.toml` in the working
//! directory, then built-in defaults. Command-line flags override all of it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Default config file probed in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hcl.toml";

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ledger storage.
    pub ledger: LedgerSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ledger]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// JSON snapshot file used by the file-backed subcommands.
    pub path: PathBuf,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hcl-ledger.json"),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from an explicit TOML file, the default file if present,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::read(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::read(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Parse config from a TOML string.
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
