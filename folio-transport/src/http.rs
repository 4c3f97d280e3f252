//! The HTTP transport.
//!
//! [`Http`] exposes GET, POST, PUT and DELETE and hides everything else:
//! - URL composition (`<origin>/api` + normalized path + query string)
//! - Default headers and bearer-token injection from [`StorageApi`]
//! - Response classification into [`Payload`]
//! - Error mapping into [`TransportError`], including the 401 flow

use std::fmt;
use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{ServerError, TransportError};
use crate::hook::{AccessDeniedHook, IgnoreAccessDenied};
use crate::host::storage::{MemoryStorage, StorageApi};
use crate::query::{append_query, build_query, normalize_path};
use crate::request::{Body, CredentialsMode, Method, RequestOptions, UrlParams};
use crate::response::Payload;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "TOKEN_KEY";

/// Value of the `Accept-Language` header sent with every request.
pub const ACCEPT_LANGUAGE: &str = "ru_RU";

/// Content type sent with every non-multipart request.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Path prefix of the API under the origin.
const API_PREFIX: &str = "/api";

/// User agent string for Folio.
const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Prepared Request
// ============================================================================

/// Where a path is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// `<origin>/api/<path>`
    Api,
    /// `<origin>/<path>`, or the path itself if it is an absolute URL.
    Direct,
}

#[derive(Debug)]
pub(crate) enum PreparedBody {
    Text(String),
    Form(Form),
}

/// A fully built request, before it is handed to reqwest.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<PreparedBody>,
    pub(crate) credentials: CredentialsMode,
}

impl PreparedRequest {
    fn into_builder(self, client: &Client) -> RequestBuilder {
        let builder = client
            .request(self.method.into(), self.url)
            .headers(self.headers);

        match self.body {
            None => builder,
            Some(PreparedBody::Text(text)) => builder.body(text),
            Some(PreparedBody::Form(form)) => builder.multipart(form),
        }
    }
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// HTTP transport for the portfolio API.
///
/// Cloning is cheap; clones share the connection pool, the storage and the
/// access-denied hook.
#[derive(Clone)]
pub struct Http {
    inner: Client,
    origin: Url,
    base_url: String,
    storage: Arc<dyn StorageApi>,
    on_access_denied: Arc<dyn AccessDeniedHook>,
}

impl Http {
    /// Creates a builder for a transport talking to `origin`.
    pub fn builder(origin: impl Into<String>) -> HttpBuilder {
        HttpBuilder::new(origin)
    }

    /// Returns the application origin, e.g. `https://folio.example.com`.
    pub fn origin(&self) -> String {
        self.origin.origin().ascii_serialization()
    }

    /// Returns the API base URL, e.g. `https://folio.example.com/api`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the storage holding the bearer token.
    pub fn storage(&self) -> &Arc<dyn StorageApi> {
        &self.storage
    }

    /// Returns true if a non-blank token is stored.
    pub async fn has_token(&self) -> bool {
        self.token().await.is_some()
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Performs a GET request on an API path.
    ///
    /// # Errors
    ///
    /// See [`TransportError`].
    pub async fn get(
        &self,
        path: &str,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
    ) -> Result<Payload, TransportError> {
        self.do_request(Method::Get, path, None, params, options, Target::Api)
            .await
    }

    /// Performs a GET request without the API base path.
    ///
    /// Relative paths resolve against the origin; absolute URLs are used
    /// as-is.
    ///
    /// # Errors
    ///
    /// See [`TransportError`].
    pub async fn get_direct(
        &self,
        path: &str,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
    ) -> Result<Payload, TransportError> {
        self.do_request(Method::Get, path, None, params, options, Target::Direct)
            .await
    }

    /// Performs a POST request.
    ///
    /// # Errors
    ///
    /// See [`TransportError`].
    pub async fn post(
        &self,
        path: &str,
        body: Option<Body>,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
    ) -> Result<Payload, TransportError> {
        self.do_request(Method::Post, path, body, params, options, Target::Api)
            .await
    }

    /// Performs a PUT request.
    ///
    /// # Errors
    ///
    /// See [`TransportError`].
    pub async fn put(
        &self,
        path: &str,
        body: Option<Body>,
        options: Option<RequestOptions>,
    ) -> Result<Payload, TransportError> {
        self.do_request(Method::Put, path, body, None, options, Target::Api)
            .await
    }

    /// Performs a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`TransportError`].
    pub async fn delete(
        &self,
        path: &str,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
    ) -> Result<Payload, TransportError> {
        self.do_request(Method::Delete, path, None, params, options, Target::Api)
            .await
    }

    // ========================================================================
    // Request Pipeline
    // ========================================================================

    #[instrument(skip(self, method, body, params, options), fields(method = %method))]
    async fn do_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
        target: Target,
    ) -> Result<Payload, TransportError> {
        let prepared = self.prepare(method, path, body, params, options, target).await;
        debug!(url = %prepared.url, credentials = ?prepared.credentials, "Sending request");

        let response = prepared
            .into_builder(&self.inner)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    TransportError::InvalidUrl(e.to_string())
                } else {
                    warn!(error = %e, "Request failed before a response arrived");
                    TransportError::Network(e)
                }
            })?;

        debug!(status = %response.status(), "Response received");

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        Payload::classify(response).await
    }

    async fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        params: Option<&UrlParams>,
        options: Option<RequestOptions>,
        target: Target,
    ) -> PreparedRequest {
        let url = self.resolve_url(path, params, target);
        let options = options.unwrap_or_default();
        let is_form = body.as_ref().is_some_and(Body::is_form);

        let mut headers = match options.headers {
            Some(custom) => custom,
            None => self.default_headers(is_form).await,
        };

        if let Some(cache_control) = options.cache.and_then(|c| c.cache_control()) {
            if !headers.contains_key(header::CACHE_CONTROL) {
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));
            }
        }

        let body = match body {
            None | Some(Body::Json(Value::Null)) => None,
            Some(Body::Text(text)) if text.is_empty() => None,
            Some(Body::Json(value)) => Some(PreparedBody::Text(value.to_string())),
            Some(Body::Text(text)) => Some(PreparedBody::Text(text)),
            Some(Body::Form(form)) => Some(PreparedBody::Form(form)),
        };

        PreparedRequest {
            method,
            url,
            headers,
            body,
            credentials: options.credentials.unwrap_or_default(),
        }
    }

    fn resolve_url(&self, path: &str, params: Option<&UrlParams>, target: Target) -> String {
        let url = match target {
            Target::Api => format!("{}{}", self.base_url, normalize_path(path)),
            Target::Direct if is_absolute_url(path) => path.to_string(),
            Target::Direct => format!("{}{}", self.origin(), normalize_path(path)),
        };

        match params {
            Some(params) => append_query(&url, &build_query(params)),
            None => url,
        }
    }

    async fn default_headers(&self, is_form: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        if !is_form {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
        }

        if let Some(token) = self.token().await {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending request without it"),
            }
        }

        headers
    }

    /// Reads the stored token. Blank tokens and storage failures count as none.
    async fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    async fn handle_error(&self, response: Response) -> TransportError {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("Access denied, clearing stored token");
            if let Err(e) = self.storage.delete(TOKEN_KEY).await {
                warn!(error = %e, "Failed to clear stored token");
            }
            self.on_access_denied.on_access_denied(&self.origin);
            return TransportError::AccessDenied;
        }

        let status_text = status.canonical_reason().unwrap_or_default();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                debug!(error = %e, "Failed to read error body");
                Vec::new()
            }
        };

        let error = ServerError::from_body(status.as_u16(), status_text, &body);
        debug!(status = error.status, code = ?error.code, message = %error.message, "Server error");
        TransportError::Server(error)
    }
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

// ============================================================================
// HTTP Builder
// ============================================================================

/// Builder for constructing an [`Http`] transport.
pub struct HttpBuilder {
    origin: String,
    client: Option<Client>,
    storage: Option<Arc<dyn StorageApi>>,
    on_access_denied: Option<Arc<dyn AccessDeniedHook>>,
}

impl HttpBuilder {
    /// Creates a new builder.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            client: None,
            storage: None,
            on_access_denied: None,
        }
    }

    /// Sets the reqwest client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the token storage.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn StorageApi>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the hook called on a 401 response.
    #[must_use]
    pub fn on_access_denied(mut self, hook: Arc<dyn AccessDeniedHook>) -> Self {
        self.on_access_denied = Some(hook);
        self
    }

    /// Builds the transport.
    ///
    /// Any path, query or fragment on the origin is ignored.
    ///
    /// # Errors
    ///
    /// Fails if the origin is not an absolute `http`/`https` URL or the
    /// default client cannot be created.
    pub fn build(self) -> Result<Http, TransportError> {
        let parsed = Url::parse(&self.origin)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.origin)))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(TransportError::InvalidUrl(format!(
                "{}: origin must be an http or https URL",
                self.origin
            )));
        }

        let origin_str = parsed.origin().ascii_serialization();
        let origin = Url::parse(&origin_str).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(TransportError::Client)?,
        };

        debug!(origin = %origin_str, "Created HTTP transport");

        Ok(Http {
            inner: client,
            base_url: format!("{origin_str}{API_PREFIX}"),
            origin,
            storage: self
                .storage
                .unwrap_or_else(|| Arc::new(MemoryStorage::new())),
            on_access_denied: self
                .on_access_denied
                .unwrap_or_else(|| Arc::new(IgnoreAccessDenied)),
        })
    }
}

impl fmt::Debug for HttpBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBuilder")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CacheMode;
    use serde_json::json;

    const ORIGIN: &str = "https://folio.example.com";

    fn transport_with_token(token: &str) -> Http {
        Http::builder(ORIGIN)
            .storage(Arc::new(MemoryStorage::with_entry(TOKEN_KEY, token)))
            .build()
            .unwrap()
    }

    fn header_value<'a>(prepared: &'a PreparedRequest, name: header::HeaderName) -> Option<&'a str> {
        prepared.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_builder_strips_origin_path() {
        let http = Http::builder("https://folio.example.com/portfolio/123?tab=1")
            .build()
            .unwrap();
        assert_eq!(http.origin(), ORIGIN);
        assert_eq!(http.base_url(), "https://folio.example.com/api");
    }

    #[test]
    fn test_builder_keeps_port() {
        let http = Http::builder("http://127.0.0.1:8080").build().unwrap();
        assert_eq!(http.base_url(), "http://127.0.0.1:8080/api");
    }

    #[test]
    fn test_builder_rejects_bad_origins() {
        assert!(matches!(
            Http::builder("not a url").build(),
            Err(TransportError::InvalidUrl(_))
        ));
        assert!(matches!(
            Http::builder("file:///tmp/x").build(),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_path_gets_exactly_one_slash() {
        let http = transport_with_token("");
        for path in ["portfolio-info", "/portfolio-info", "//portfolio-info"] {
            let prepared = http
                .prepare(Method::Get, path, None, None, None, Target::Api)
                .await;
            assert_eq!(prepared.url, "https://folio.example.com/api/portfolio-info");
        }
    }

    #[tokio::test]
    async fn test_query_is_appended() {
        let http = transport_with_token("");
        let params = UrlParams::new().with("ids", vec!["1", "2"]).with("full", true);
        let prepared = http
            .prepare(Method::Delete, "trades", None, Some(&params), None, Target::Api)
            .await;
        assert_eq!(
            prepared.url,
            "https://folio.example.com/api/trades?ids=1&ids=2&full=true"
        );
    }

    #[tokio::test]
    async fn test_direct_target_skips_api_prefix() {
        let http = transport_with_token("");
        let prepared = http
            .prepare(Method::Get, "static/version.json", None, None, None, Target::Direct)
            .await;
        assert_eq!(prepared.url, "https://folio.example.com/static/version.json");

        let prepared = http
            .prepare(Method::Get, "https://cdn.example.org/x", None, None, None, Target::Direct)
            .await;
        assert_eq!(prepared.url, "https://cdn.example.org/x");
    }

    #[tokio::test]
    async fn test_default_headers_with_token() {
        let http = transport_with_token("abc123");
        let prepared = http
            .prepare(Method::Get, "portfolio-info", None, None, None, Target::Api)
            .await;

        assert_eq!(header_value(&prepared, header::ACCEPT_LANGUAGE), Some("ru_RU"));
        assert_eq!(header_value(&prepared, header::CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        assert_eq!(header_value(&prepared, header::AUTHORIZATION), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_blank_token_is_not_sent() {
        for token in ["", "   "] {
            let http = transport_with_token(token);
            let prepared = http
                .prepare(Method::Get, "portfolio-info", None, None, None, Target::Api)
                .await;
            assert!(!prepared.headers.contains_key(header::AUTHORIZATION));
        }
    }

    #[tokio::test]
    async fn test_structured_body_is_json_encoded() {
        let http = transport_with_token("");
        let body = Body::Json(json!({"name": "Main", "access": 1}));
        let prepared = http
            .prepare(Method::Post, "portfolio-info", Some(body), None, None, Target::Api)
            .await;

        assert_eq!(header_value(&prepared, header::CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        match prepared.body {
            Some(PreparedBody::Text(text)) => {
                let decoded: Value = serde_json::from_str(&text).unwrap();
                assert_eq!(decoded, json!({"name": "Main", "access": 1}));
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_string_body_passes_through() {
        let http = transport_with_token("");
        let prepared = http
            .prepare(Method::Put, "notes", Some(Body::from("raw")), None, None, Target::Api)
            .await;
        assert!(matches!(prepared.body, Some(PreparedBody::Text(ref t)) if t == "raw"));
        assert_eq!(header_value(&prepared, header::CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_form_body_gets_no_json_content_type() {
        let http = transport_with_token("abc123");
        let form = Form::new().text("provider", "TINKOFF");
        let prepared = http
            .prepare(Method::Post, "import", Some(Body::Form(form)), None, None, Target::Api)
            .await;

        assert!(!prepared.headers.contains_key(header::CONTENT_TYPE));
        assert!(matches!(prepared.body, Some(PreparedBody::Form(_))));
        assert_eq!(header_value(&prepared, header::AUTHORIZATION), Some("Bearer abc123"));
    }

    #[tokio::test]
    async fn test_null_and_empty_bodies_are_dropped() {
        let http = transport_with_token("");
        let prepared = http
            .prepare(Method::Post, "x", Some(Body::Json(Value::Null)), None, None, Target::Api)
            .await;
        assert!(prepared.body.is_none());

        let prepared = http
            .prepare(Method::Post, "x", Some(Body::from("")), None, None, Target::Api)
            .await;
        assert!(prepared.body.is_none());
    }

    #[tokio::test]
    async fn test_custom_headers_replace_defaults() {
        let http = transport_with_token("abc123");
        let options = RequestOptions::new()
            .header(header::ACCEPT, HeaderValue::from_static("text/csv"))
            .cache(CacheMode::NoStore);
        let prepared = http
            .prepare(Method::Get, "export", None, None, Some(options), Target::Api)
            .await;

        assert_eq!(header_value(&prepared, header::ACCEPT), Some("text/csv"));
        assert_eq!(header_value(&prepared, header::CACHE_CONTROL), Some("no-store"));
        assert!(!prepared.headers.contains_key(header::ACCEPT_LANGUAGE));
        assert!(!prepared.headers.contains_key(header::AUTHORIZATION));
        assert_eq!(prepared.method, Method::Get);
    }

    #[tokio::test]
    async fn test_credentials_mode_keeps_bearer_token() {
        let http = transport_with_token("abc123");

        for mode in [CredentialsMode::Omit, CredentialsMode::SameOrigin, CredentialsMode::Include] {
            let options = RequestOptions::new().credentials(mode);
            let prepared = http
                .prepare(Method::Get, "x", None, None, Some(options), Target::Api)
                .await;
            assert_eq!(header_value(&prepared, header::AUTHORIZATION), Some("Bearer abc123"));
            assert_eq!(prepared.credentials, mode);

            // Foreign hosts get the token too
            let options = RequestOptions::new().credentials(mode);
            let prepared = http
                .prepare(
                    Method::Get,
                    "https://cdn.example.org/x",
                    None,
                    None,
                    Some(options),
                    Target::Direct,
                )
                .await;
            assert_eq!(header_value(&prepared, header::AUTHORIZATION), Some("Bearer abc123"));
        }

        let prepared = http
            .prepare(Method::Get, "x", None, None, None, Target::Api)
            .await;
        assert_eq!(prepared.credentials, CredentialsMode::SameOrigin);
    }

    #[tokio::test]
    async fn test_token_is_read_per_call() {
        let storage = Arc::new(MemoryStorage::new());
        let http = Http::builder(ORIGIN).storage(storage.clone()).build().unwrap();
        assert!(!http.has_token().await);

        storage.set(TOKEN_KEY, "fresh").await.unwrap();
        let prepared = http
            .prepare(Method::Get, "x", None, None, None, Target::Api)
            .await;
        assert_eq!(header_value(&prepared, header::AUTHORIZATION), Some("Bearer fresh"));
    }
}
