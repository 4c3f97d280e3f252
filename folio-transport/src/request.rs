//! Request descriptor types.
//!
//! - [`Method`] - The four verbs the transport supports
//! - [`UrlParams`] / [`QueryValue`] - Query-parameter mapping
//! - [`Body`] - Request body (structured, text or multipart form)
//! - [`RequestOptions`] - Cache, credentials and header overrides

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Method
// ============================================================================

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// A single query-parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// String value.
    Str(String),
    /// Signed integer, written exactly.
    Int(i64),
    /// Unsigned integer, written exactly.
    UInt(u64),
    /// Floating-point value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Ordered list, expanded into repeated `key=value` pairs.
    List(Vec<String>),
}

impl QueryValue {
    /// Returns the query-string forms of this value, one per pair.
    pub fn to_query_values(&self) -> Vec<String> {
        match self {
            Self::Str(s) => vec![s.clone()],
            Self::Int(n) => vec![n.to_string()],
            Self::UInt(n) => vec![n.to_string()],
            Self::Number(n) => vec![n.to_string()],
            Self::Bool(b) => vec![b.to_string()],
            Self::List(values) => values.clone(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for QueryValue {
    fn from(values: &[&str]) -> Self {
        Self::List(values.iter().map(|v| (*v).to_string()).collect())
    }
}

/// Query-parameter mapping.
///
/// Keys are unique and keep their insertion order; inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams {
    entries: Vec<(String, QueryValue)>,
}

impl UrlParams {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for UrlParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// ============================================================================
// Body
// ============================================================================

/// Request body.
#[derive(Debug)]
pub enum Body {
    /// Structured data, serialized to JSON.
    Json(Value),
    /// A string sent as-is.
    Text(String),
    /// Multipart form data, sent without the JSON content type.
    Form(Form),
}

impl Body {
    /// Serializes any value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Returns true for multipart form bodies.
    pub fn is_form(&self) -> bool {
        matches!(self, Self::Form(_))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Form> for Body {
    fn from(form: Form) -> Self {
        Self::Form(form)
    }
}

// ============================================================================
// Options
// ============================================================================

/// Cache mode of a request, sent as a `Cache-Control` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// No cache directive.
    #[default]
    Default,
    /// Do not store the response anywhere.
    NoStore,
    /// Bypass caches and fetch from the server.
    Reload,
    /// Revalidate before using a cached response.
    NoCache,
    /// Prefer a cached response even if stale.
    ForceCache,
    /// Only answer from a cache.
    OnlyIfCached,
}

impl CacheMode {
    /// Returns the `Cache-Control` value for this mode.
    pub fn cache_control(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::NoStore => Some("no-store"),
            Self::Reload => Some("no-cache"),
            Self::NoCache => Some("max-age=0"),
            Self::ForceCache => Some("max-stale"),
            Self::OnlyIfCached => Some("only-if-cached"),
        }
    }
}

/// Credentials mode of a request.
///
/// Recorded with the request and logged; it governs ambient credentials such
/// as cookies, never the `Authorization` header. The stored bearer token is
/// attached whenever the default headers are used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialsMode {
    /// Send no ambient credentials.
    Omit,
    /// Send ambient credentials to the configured origin only.
    #[default]
    SameOrigin,
    /// Send ambient credentials everywhere.
    Include,
}

/// Per-call overrides.
///
/// Method and body are never part of the options; they are set by the verb
/// and the body argument.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Cache mode.
    pub cache: Option<CacheMode>,
    /// Credentials mode.
    pub credentials: Option<CredentialsMode>,
    /// Headers replacing the default header set.
    pub headers: Option<HeaderMap>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache mode.
    #[must_use]
    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the credentials mode.
    #[must_use]
    pub fn credentials(mut self, credentials: CredentialsMode) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replaces the default headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Adds one header to the replacement header set.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_params_keep_insertion_order() {
        let params = UrlParams::new()
            .with("zeta", 1)
            .with("alpha", "a")
            .with("mid", true);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_url_params_insert_replaces() {
        let mut params = UrlParams::new();
        params.insert("page", 1).insert("size", 20).insert("page", 2);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("page"), Some(&QueryValue::Int(2)));
        assert_eq!(params.iter().next().map(|(k, _)| k), Some("page"));
    }

    #[test]
    fn test_query_value_strings() {
        assert_eq!(QueryValue::from(5).to_query_values(), vec!["5"]);
        assert_eq!(QueryValue::from(1.5).to_query_values(), vec!["1.5"]);
        assert_eq!(QueryValue::from(false).to_query_values(), vec!["false"]);
        assert_eq!(
            QueryValue::from(vec!["a", "b"]).to_query_values(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_large_integers_stay_exact() {
        assert_eq!(
            QueryValue::from(9_007_199_254_740_993_u64).to_query_values(),
            vec!["9007199254740993"]
        );
        assert_eq!(
            QueryValue::from(-9_007_199_254_740_993_i64).to_query_values(),
            vec!["-9007199254740993"]
        );
        assert_eq!(QueryValue::from(u64::MAX).to_query_values(), vec!["18446744073709551615"]);
    }

    #[test]
    fn test_body_json_and_form_detection() {
        #[derive(Serialize)]
        struct Trade {
            ticker: &'static str,
            quantity: u32,
        }

        let body = Body::json(&Trade {
            ticker: "SBER",
            quantity: 10,
        })
        .unwrap();
        assert!(matches!(&body, Body::Json(v) if *v == json!({"ticker": "SBER", "quantity": 10})));
        assert!(!body.is_form());

        assert!(Body::from(Form::new().text("file", "x")).is_form());
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::new()
            .cache(CacheMode::NoStore)
            .credentials(CredentialsMode::Omit)
            .header(
                reqwest::header::ACCEPT,
                HeaderValue::from_static("text/csv"),
            );

        assert_eq!(options.cache, Some(CacheMode::NoStore));
        assert_eq!(options.credentials, Some(CredentialsMode::Omit));
        assert_eq!(options.headers.map(|h| h.len()), Some(1));
    }

    #[test]
    fn test_cache_control_values() {
        assert_eq!(CacheMode::Default.cache_control(), None);
        assert_eq!(CacheMode::NoStore.cache_control(), Some("no-store"));
        assert_eq!(CacheMode::Reload.cache_control(), Some("no-cache"));
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(Method::Put.to_string(), "PUT");
    }
}
