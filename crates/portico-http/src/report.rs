//! Reporting instead of returning errors
//!
//! A page made of several independently loaded panels should not fail as a
//! whole because one panel's call failed. Such callers hand failures to an
//! [`ErrorReporter`] and carry on with "no value":
//!
//! ```no_run
//! # use portico_http::{ActionClient, ReportExt};
//! # use portico_core::PorticoError;
//! # async fn panel(client: &ActionClient) {
//! let notify = |err: &PorticoError| eprintln!("{}: {}", err.kind(), err.message());
//! let stats: Option<serde_json::Value> = client.reporting(&notify).get("stats").await;
//! let users: Option<serde_json::Value> = client.get("users").await.or_report(&notify);
//! # }
//! ```

use portico_core::query::{PageableResult, Pagination, Query, Searchable};
use portico_core::{PorticoError, Result};
use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ActionClient;

/// Sink for classified failures.
pub trait ErrorReporter: Send + Sync {
    /// Receive one failure
    fn report(&self, error: &PorticoError);
}

impl<F> ErrorReporter for F
where
    F: Fn(&PorticoError) + Send + Sync,
{
    fn report(&self, error: &PorticoError) {
        self(error);
    }
}

/// Convert a `Result` into an `Option`, reporting the error.
pub trait ReportExt<T> {
    /// `Some(value)` on success; on failure hand the error to `reporter`
    /// exactly once and return `None`.
    fn or_report<R: ErrorReporter + ?Sized>(self, reporter: &R) -> Option<T>;
}

impl<T> ReportExt<T> for Result<T> {
    fn or_report<R: ErrorReporter + ?Sized>(self, reporter: &R) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(kind = %err.kind(), "Routing failure to reporter");
                reporter.report(&err);
                None
            }
        }
    }
}

/// [`ActionClient`] view whose calls report failures and yield `Option`.
pub struct ReportingClient<'a, R: ?Sized> {
    client: &'a ActionClient,
    reporter: &'a R,
}

impl<'a, R: ErrorReporter + ?Sized> ReportingClient<'a, R> {
    pub(crate) fn new(client: &'a ActionClient, reporter: &'a R) -> Self {
        Self { client, reporter }
    }

    /// See [`ActionClient::get`]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.client.get(path).await.or_report(self.reporter)
    }

    /// See [`ActionClient::post`]
    pub async fn post<I, O>(&self, path: &str, body: &I) -> Option<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.client.post(path, body).await.or_report(self.reporter)
    }

    /// See [`ActionClient::put`]
    pub async fn put<I, O>(&self, path: &str, body: &I) -> Option<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        self.client.put(path, body).await.or_report(self.reporter)
    }

    /// See [`ActionClient::post_multipart`]
    pub async fn post_multipart<O: DeserializeOwned>(&self, path: &str, form: Form) -> Option<O> {
        self.client
            .post_multipart(path, form)
            .await
            .or_report(self.reporter)
    }

    /// See [`ActionClient::put_multipart`]
    pub async fn put_multipart<O: DeserializeOwned>(&self, path: &str, form: Form) -> Option<O> {
        self.client
            .put_multipart(path, form)
            .await
            .or_report(self.reporter)
    }

    /// See [`ActionClient::delete_exec`]
    pub async fn delete_exec(&self, path: &str) -> Option<()> {
        self.client.delete_exec(path).await.or_report(self.reporter)
    }

    /// See [`ActionClient::do_advance_search`]
    pub async fn do_advance_search<E: Searchable>(
        &self,
        path: &str,
        query: &Query<E::Field>,
        pagination: &Pagination,
    ) -> Option<PageableResult<E>> {
        self.client
            .do_advance_search(path, query, pagination)
            .await
            .or_report(self.reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_ok_passes_through_without_report() {
        let seen = Mutex::new(Vec::new());
        let reporter = |err: &PorticoError| seen.lock().unwrap_or_else(|e| e.into_inner()).push(err.clone());
        assert_eq!(Ok::<_, PorticoError>(7).or_report(&reporter), Some(7));
        assert!(seen.lock().unwrap_or_else(|e| e.into_inner()).is_empty());
    }

    #[test]
    fn test_err_reported_once() {
        let seen = Mutex::new(Vec::new());
        let reporter = |err: &PorticoError| seen.lock().unwrap_or_else(|e| e.into_inner()).push(err.clone());
        let result: Result<u8> = Err(PorticoError::not_found("user 3"));
        assert_eq!(result.or_report(&reporter), None);
        let seen = seen.into_inner().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen, vec![PorticoError::not_found("user 3")]);
    }

    #[test]
    fn test_trait_object_reporter() {
        struct Counter(std::sync::atomic::AtomicUsize);
        impl ErrorReporter for Counter {
            fn report(&self, _error: &PorticoError) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
        let counter = Counter(std::sync::atomic::AtomicUsize::new(0));
        let reporter: &dyn ErrorReporter = &counter;
        let result: Result<()> = Err(PorticoError::network("refused"));
        assert!(result.or_report(reporter).is_none());
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
