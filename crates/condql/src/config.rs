//! Compiler configuration.
//!
//! Loaded from a TOML file, a TOML string, or the process environment:
//!
//! ```toml
//! dialect = "pgsql"
//! adapt_dialect = true
//! ```
//!
//! Environment variables: `DB_DRIVER` (falling back to `DB_CONNECTION`) and
//! `DB_AUTO_ADAPT`.

use crate::dialect::Dialect;
use crate::error::{BuildError, BuildResult};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the database driver.
pub const ENV_DRIVER: &str = "DB_DRIVER";
/// Fallback environment variable naming the database driver.
pub const ENV_CONNECTION: &str = "DB_CONNECTION";
/// Environment variable toggling the LIKE -> ILIKE rewrite.
pub const ENV_AUTO_ADAPT: &str = "DB_AUTO_ADAPT";

/// Settings consulted by the [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Active SQL dialect.
    pub dialect: Dialect,
    /// Rewrite `LIKE` to `ILIKE` on PostgreSQL-family dialects.
    pub adapt_dialect: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::MySql,
            adapt_dialect: true,
        }
    }
}

impl CompilerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable or disable dialect adaptation.
    pub fn adapt_dialect(mut self, enabled: bool) -> Self {
        self.adapt_dialect = enabled;
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> BuildResult<Self> {
        toml::from_str(raw).map_err(|e| BuildError::config(format!("invalid config: {e}")))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BuildError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            BuildError::Config(msg) => {
                BuildError::config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Read configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> BuildResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BuildResult<Self> {
        let mut config = Self::default();

        if let Some(driver) = lookup(ENV_DRIVER).or_else(|| lookup(ENV_CONNECTION)) {
            config.dialect = driver.parse()?;
        }
        if let Some(flag) = lookup(ENV_AUTO_ADAPT) {
            config.adapt_dialect = parse_flag(&flag).ok_or_else(|| {
                BuildError::config(format!("{ENV_AUTO_ADAPT} must be a boolean, got '{flag}'"))
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
