//! Uniform request executor
//!
//! Every call follows the same path: capture the bearer token, build the
//! request, send it exactly once, then either decode a 2xx body or classify
//! the failure. There are no retries and no built-in timeout; callers that
//! need either wrap the returned future.

use std::sync::Arc;

use portico_core::query::{PageableResult, Pagination, Query, Searchable};
use portico_core::{PorticoError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::classify;
use crate::config::ClientConfig;
use crate::credentials::CredentialProvider;
use crate::report::{ErrorReporter, ReportingClient};

enum Body {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

/// HTTP action layer.
///
/// Cheap to clone; clones share the connection pool and credential provider.
#[derive(Clone)]
pub struct ActionClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for ActionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ActionClient {
    /// Build a client from validated configuration.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PorticoError::validation(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(http, config, credentials))
    }

    /// Build a client around an existing reqwest client.
    ///
    /// The configuration's user agent is ignored; `http` keeps its own.
    pub fn with_http_client(
        http: reqwest::Client,
        config: &ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            credentials,
        }
    }

    /// View of this client that routes failures to `reporter`.
    pub fn reporting<'a, R>(&'a self, reporter: &'a R) -> ReportingClient<'a, R>
    where
        R: ErrorReporter + ?Sized,
    {
        ReportingClient::new(self, reporter)
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path`, decoding the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, Body::Empty).await?;
        decode(response).await
    }

    /// `POST path` with a JSON body
    pub async fn post<I, O>(&self, path: &str, body: &I) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response = self.execute(Method::POST, path, json_body(body)?).await?;
        decode(response).await
    }

    /// `PUT path` with a JSON body
    pub async fn put<I, O>(&self, path: &str, body: &I) -> Result<O>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let response = self.execute(Method::PUT, path, json_body(body)?).await?;
        decode(response).await
    }

    /// `POST path` with a multipart form, passed through unchanged
    pub async fn post_multipart<O: DeserializeOwned>(&self, path: &str, form: Form) -> Result<O> {
        let response = self.execute(Method::POST, path, Body::Multipart(form)).await?;
        decode(response).await
    }

    /// `PUT path` with a multipart form, passed through unchanged
    pub async fn put_multipart<O: DeserializeOwned>(&self, path: &str, form: Form) -> Result<O> {
        let response = self.execute(Method::PUT, path, Body::Multipart(form)).await?;
        decode(response).await
    }

    /// `DELETE path`; any response body is discarded
    pub async fn delete_exec(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, Body::Empty).await?;
        Ok(())
    }

    /// Advanced search: `POST path` with the query and pagination as the body.
    pub async fn do_advance_search<E: Searchable>(
        &self,
        path: &str,
        query: &Query<E::Field>,
        pagination: &Pagination,
    ) -> Result<PageableResult<E>> {
        self.post(path, &query.to_request(pagination)).await
    }

    /// Alias of [`do_advance_search`](Self::do_advance_search)
    pub async fn search<E: Searchable>(
        &self,
        endpoint: &str,
        query: &Query<E::Field>,
        pagination: &Pagination,
    ) -> Result<PageableResult<E>> {
        self.do_advance_search(endpoint, query, pagination).await
    }

    async fn execute(&self, method: Method, path: &str, body: Body) -> Result<Response> {
        // Token is captured here; a later session update does not affect this call
        let token = self.credentials.current_token()?;
        let url = self.url(path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token.expose());
        request = match body {
            Body::Empty => request,
            Body::Json(bytes) => request.header(CONTENT_TYPE, "application/json").body(bytes),
            Body::Multipart(form) => request.multipart(form),
        };

        tracing::debug!(%method, path, "Dispatching request");
        let response = request.send().await.map_err(|e| {
            let err = classify::transport_error(&e);
            tracing::warn!(%method, path, kind = %err.kind(), "Request failed without a response");
            err
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let err = classify::response_error(response).await;
        tracing::warn!(
            %method,
            path,
            status = status.as_u16(),
            kind = %err.kind(),
            "Request failed"
        );
        Err(err)
    }
}

fn json_body<I: Serialize + ?Sized>(body: &I) -> Result<Body> {
    Ok(Body::Json(serde_json::to_vec(body)?))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PorticoError::network(format!("Failed to read response body: {e}")))?;

    // An empty body (e.g. 204) decodes as JSON null, which fits `()` and `Option<_>`
    let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(payload).map_err(|e| classify::unexpected_body(status, &e))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::credentials::{AccessTokenCache, StaticCredentials};
    use portico_core::ErrorKind;

    fn client(base_url: &str) -> ActionClient {
        ActionClient::new(
            &ClientConfig::new(base_url),
            Arc::new(StaticCredentials::new("token")),
        )
        .expect("valid config")
    }

    #[test]
    fn test_url_joining() {
        let client = client("https://admin.example.com/api/");
        assert_eq!(client.url("/users/1"), "https://admin.example.com/api/users/1");
        assert_eq!(client.url("users"), "https://admin.example.com/api/users");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ActionClient::new(
            &ClientConfig::default(),
            Arc::new(StaticCredentials::new("token")),
        )
        .expect_err("missing base url");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_dispatch() {
        // Nothing listens on port 9; reaching the network would yield NetworkError
        let client = ActionClient::new(
            &ClientConfig::new("http://127.0.0.1:9"),
            Arc::new(AccessTokenCache::new()),
        )
        .expect("valid config");
        let err = client
            .get::<serde_json::Value>("anything")
            .await
            .expect_err("no token");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_unserializable_body_is_validation() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1_u8], "non-string key");
        let err = json_body(&map).err().expect("map keys must be strings");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
