//! Portico HTTP - uniform action layer
//!
//! Executes JSON and multipart calls against the admin backend with the
//! session's bearer credential attached, and turns every failure into a
//! classified [`PorticoError`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use portico_http::{AccessTokenCache, ActionClient, ClientConfig};
//!
//! # async fn run() -> portico_core::Result<()> {
//! let tokens = Arc::new(AccessTokenCache::new());
//! tokens.set_from_session("eyJhbGciOi...");
//!
//! let client = ActionClient::new(&ClientConfig::new("https://admin.example.com/api"), tokens)?;
//! let me: serde_json::Value = client.get("users/me").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod classify;
mod client;
pub mod config;
pub mod credentials;
pub mod report;

pub use classify::classify_response;
pub use client::ActionClient;
pub use config::{ClientConfig, ConfigError};
pub use credentials::{AccessToken, AccessTokenCache, CredentialProvider, StaticCredentials};
pub use portico_core::{ErrorKind, PorticoError, Result};
pub use report::{ErrorReporter, ReportExt, ReportingClient};
