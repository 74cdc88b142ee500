//! Compiler configuration.
//!
//! The only setting is the page size used when a query names neither `take`
//! nor `limit`. It can come from code, a `RELQUERY_DEFAULT_LIMIT` environment
//! variable, or a TOML file:
//!
//! ```toml
//! [relquery]
//! default_limit = 50
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RelQueryError, RelQueryResult};

/// Page size used when the query does not give one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Environment variable overriding [`DEFAULT_LIMIT`].
pub const DEFAULT_LIMIT_ENV: &str = "RELQUERY_DEFAULT_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub default_limit: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    relquery: CompilerConfig,
}

impl CompilerConfig {
    /// Set the default page size.
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Defaults, overridden by `RELQUERY_DEFAULT_LIMIT` when it is set.
    pub fn from_env() -> RelQueryResult<Self> {
        Self::default().apply_env(std::env::var(DEFAULT_LIMIT_ENV).ok().as_deref())
    }

    /// Override the default page size from a raw environment value.
    pub fn apply_env(self, raw: Option<&str>) -> RelQueryResult<Self> {
        let Some(raw) = raw else {
            return Ok(self);
        };
        let limit = raw.trim().parse::<u32>().map_err(|_| {
            RelQueryError::config(format!(
                "{} must be a non-negative integer, got '{}'",
                DEFAULT_LIMIT_ENV, raw
            ))
        })?;
        debug!(default_limit = limit, "default limit taken from environment");
        Ok(self.with_default_limit(limit))
    }

    /// Read the `[relquery]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> RelQueryResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.relquery)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> RelQueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), default_limit = config.default_limit, "loaded config");
        Ok(config)
    }
}
