// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Folio API
//!
//! Typed services on top of [`folio_transport::Http`].
//!
//! - [`PortfolioService`] - Portfolio CRUD, share notes, copies, backups and
//!   public links
//! - [`ClientService`] - Login and logout
//!
//! Both take the transport at construction; nothing here is global.
//!
//! ```ignore
//! let http = Http::builder("https://folio.example.com").build()?;
//! let client = ClientService::new(http.clone());
//! client.login(&LoginRequest::new("user", "secret")).await?;
//!
//! let portfolios = PortfolioService::new(http).get_portfolios().await?;
//! ```

pub mod client;
pub mod error;
pub mod portfolio;

pub use client::{ClientService, LOGIN_PATH};
pub use error::ApiError;
pub use portfolio::{PortfolioService, ENDPOINT_BASE};
