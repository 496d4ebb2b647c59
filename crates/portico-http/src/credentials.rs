//! Bearer credentials
//!
//! The action layer never reaches for global state: it is handed a
//! [`CredentialProvider`] at construction and asks it for the current token
//! once per call, at dispatch time. [`AccessTokenCache`] is the provider fed by
//! the session layer; [`StaticCredentials`] serves fixed tokens.

use parking_lot::RwLock;
use portico_core::{PorticoError, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A bearer credential. Redacted in `Debug`, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw credential
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw credential, for the `Authorization` header only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Don't expose the credential in debug output
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// Source of the bearer credential attached to outgoing calls.
pub trait CredentialProvider: Send + Sync {
    /// Token to use for a call dispatched now.
    ///
    /// Fails with `Unauthorized` when no credential is available.
    fn current_token(&self) -> Result<AccessToken>;
}

/// Holder of the session's current bearer credential.
///
/// Starts empty. The session layer pushes each new credential through
/// [`set_from_session`](Self::set_from_session); the cache never expires a
/// token on its own. Readers get a clone, so a call keeps the token it was
/// dispatched with even if the session replaces it mid-flight.
#[derive(Debug, Default)]
pub struct AccessTokenCache {
    current: RwLock<Option<AccessToken>>,
}

impl AccessTokenCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the credential reported by the session.
    ///
    /// Empty tokens and unchanged tokens are ignored. Returns whether the
    /// cached value was replaced.
    pub fn set_from_session(&self, token: impl Into<String>) -> bool {
        let token = AccessToken::new(token);
        if token.expose().is_empty() {
            tracing::debug!("Ignoring empty session token");
            return false;
        }

        let mut current = self.current.write();
        if current.as_ref() == Some(&token) {
            return false;
        }
        *current = Some(token);
        tracing::info!("Access token updated from session");
        true
    }

    /// Current credential, or `Unauthorized` if none was ever set
    pub fn get_current(&self) -> Result<AccessToken> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| PorticoError::unauthorized("No access token has been set"))
    }

    /// Whether a credential is cached
    pub fn has_token(&self) -> bool {
        self.current.read().is_some()
    }

    /// Drop the cached credential, e.g. on sign-out
    pub fn clear(&self) {
        if self.current.write().take().is_some() {
            tracing::info!("Access token cleared");
        }
    }
}

impl CredentialProvider for AccessTokenCache {
    fn current_token(&self) -> Result<AccessToken> {
        self.get_current()
    }
}

/// Provider that always returns the same token (service accounts, tests).
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: AccessToken,
}

impl StaticCredentials {
    /// Provider for a fixed token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn current_token(&self) -> Result<AccessToken> {
        if self.token.expose().is_empty() {
            return Err(PorticoError::unauthorized("Static credential is empty"));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use portico_core::ErrorKind;
    use std::sync::Arc;

    #[test]
    fn test_empty_cache_is_unauthorized() {
        let cache = AccessTokenCache::new();
        let err = cache.get_current().expect_err("nothing cached");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(!cache.has_token());
    }

    #[test]
    fn test_set_and_replace() {
        let cache = AccessTokenCache::new();
        assert!(cache.set_from_session("first"));
        assert_eq!(cache.get_current().expect("cached").expose(), "first");

        assert!(!cache.set_from_session("first"), "unchanged token is ignored");
        assert!(!cache.set_from_session(""), "empty token is ignored");
        assert_eq!(cache.get_current().expect("cached").expose(), "first");

        assert!(cache.set_from_session("second"));
        assert_eq!(cache.get_current().expect("cached").expose(), "second");
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let cache = AccessTokenCache::new();
        cache.set_from_session("dispatch-time");
        let captured = cache.get_current().expect("cached");
        cache.set_from_session("later");
        assert_eq!(captured.expose(), "dispatch-time");
    }

    #[test]
    fn test_clear() {
        let cache = AccessTokenCache::new();
        cache.set_from_session("token");
        cache.clear();
        assert_eq!(
            cache.get_current().expect_err("cleared").kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_concurrent_writers_leave_a_whole_token() {
        let cache = Arc::new(AccessTokenCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for round in 0..100 {
                        cache.set_from_session(format!("token-{i}-{round}"));
                        let token = cache.get_current().expect("set above");
                        assert!(token.expose().starts_with("token-"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert!(cache.has_token());
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = AccessToken::new("secret-value");
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new("fixed");
        assert_eq!(provider.current_token().expect("fixed").expose(), "fixed");
        let empty = StaticCredentials::new("");
        assert_eq!(
            empty.current_token().expect_err("empty").kind(),
            ErrorKind::Unauthorized
        );
    }
}
