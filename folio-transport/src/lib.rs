// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Folio Transport
//!
//! HTTP transport for the Folio portfolio API.
//!
//! ## Transport
//!
//! [`Http`] is the only request surface. It provides four verbs and takes
//! care of:
//!
//! - URL composition: `<origin>/api` + path (one leading `/`) + query string
//! - Default headers: `Accept-Language`, JSON content type (except for
//!   multipart bodies) and `Authorization: Bearer <token>` when a token is
//!   stored
//! - Response classification into [`Payload`] by content type
//! - Error mapping into [`TransportError`]; a 401 clears the token and calls
//!   the [`AccessDeniedHook`]
//!
//! ## Host APIs
//!
//! - [`host::storage`] - Key-value storage capability holding the token
//! - [`host::keychain`] - Storage backed by the system keychain
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_transport::{Http, KeychainStorage, UrlParams};
//!
//! let http = Http::builder("https://folio.example.com")
//!     .storage(Arc::new(KeychainStorage::new()))
//!     .on_access_denied(Arc::new(|origin: &url::Url| eprintln!("log in at {origin}")))
//!     .build()?;
//!
//! let params = UrlParams::new().with("tickers", vec!["SBER", "GAZP"]);
//! let quotes: Vec<Quote> = http.get("/quotes", Some(&params), None).await?.into_json()?;
//! ```

pub mod error;
pub mod hook;
pub mod host;
pub mod http;
pub mod query;
pub mod request;
pub mod response;

// Errors
pub use error::{ServerError, StorageError, TransportError};

// Transport
pub use http::{Http, HttpBuilder, ACCEPT_LANGUAGE, JSON_CONTENT_TYPE, TOKEN_KEY};
pub use hook::{AccessDeniedHook, IgnoreAccessDenied};
pub use request::{Body, CacheMode, CredentialsMode, Method, QueryValue, RequestOptions, UrlParams};
pub use response::{ContentKind, Payload};

// Host APIs
pub use host::{KeychainStorage, MemoryStorage, StorageApi};

// Re-exported so callers can build multipart bodies and headers
pub use reqwest::header;
pub use reqwest::multipart;
