//! Client configuration
//!
//! Loaded from TOML, then overridden by `PORTICO_*` environment variables,
//! then validated before an [`ActionClient`](crate::ActionClient) is built.
//!
//! ```toml
//! base_url = "https://admin.example.com/api"
//! user_agent = "backoffice/2.3"
//! default_page_size = 50
//! ```

use portico_core::query::Pagination;
use portico_core::PorticoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `base_url`
pub const ENV_BASE_URL: &str = "PORTICO_BASE_URL";
/// Environment variable overriding `user_agent`
pub const ENV_USER_AGENT: &str = "PORTICO_USER_AGENT";
/// Environment variable overriding `default_page_size`
pub const ENV_DEFAULT_PAGE_SIZE: &str = "PORTICO_DEFAULT_PAGE_SIZE";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Value is required but missing
    #[error("Field '{field}' is required but missing")]
    Required {
        /// Offending field
        field: String,
    },

    /// Value format is invalid
    #[error("Field '{field}' has invalid format. Expected: {expected}, got: {actual}")]
    InvalidFormat {
        /// Offending field
        field: String,
        /// Description of the accepted format
        expected: String,
        /// Value that was supplied
        actual: String,
    },

    /// Value is below its minimum
    #[error("Field '{field}' must be at least {min} (got {actual})")]
    OutOfRange {
        /// Offending field
        field: String,
        /// Smallest accepted value
        min: u64,
        /// Value that was supplied
        actual: u64,
    },

    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {message}")]
    Io {
        /// File that was read
        path: String,
        /// Underlying error
        message: String,
    },

    /// Configuration text is not valid TOML for this schema
    #[error("Invalid configuration: {message}")]
    Parse {
        /// Parser message
        message: String,
    },
}

impl From<ConfigError> for PorticoError {
    fn from(err: ConfigError) -> Self {
        PorticoError::validation(err.to_string())
    }
}

fn default_user_agent() -> String {
    format!("portico/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    20
}

/// Settings for an [`ActionClient`](crate::ActionClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL every request path is appended to
    pub base_url: String,

    /// `User-Agent` header for outgoing calls
    pub user_agent: String,

    /// Page size used by [`first_page`](Self::first_page)
    pub default_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: default_user_agent(),
            default_page_size: default_page_size(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, other fields defaulted
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `PORTICO_*` environment overrides
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn merge_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            self.user_agent = user_agent;
        }
        if let Some(size) = lookup(ENV_DEFAULT_PAGE_SIZE) {
            self.default_page_size = size.trim().parse().map_err(|_| ConfigError::InvalidFormat {
                field: "default_page_size".to_string(),
                expected: "positive integer".to_string(),
                actual: size.clone(),
            })?;
        }
        Ok(())
    }

    /// Check every field, reporting the first problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Required {
                field: "base_url".to_string(),
            });
        }
        let scheme_ok = reqwest::Url::parse(&self.base_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !scheme_ok {
            return Err(ConfigError::InvalidFormat {
                field: "base_url".to_string(),
                expected: "http(s) URL".to_string(),
                actual: self.base_url.clone(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Required {
                field: "user_agent".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "default_page_size".to_string(),
                min: 1,
                actual: 0,
            });
        }
        Ok(())
    }

    /// Page 1 at the configured default size
    pub fn first_page(&self) -> portico_core::Result<Pagination> {
        Pagination::first_page(self.default_page_size)
    }
}
