// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Folio Core
//!
//! Core types and models shared by the Folio crates.
//!
//! ## Key Types
//!
//! ### Portfolio Types
//! - [`PortfolioParams`] - Portfolio settings as returned by the API
//! - [`PortfolioAccountType`] - Brokerage or individual investment account
//! - [`IisType`] - Tax deduction flavour of an individual investment account
//! - [`CreatePortfolioRequest`] / [`UpdatePortfolioRequest`] - Write payloads
//! - [`PortfolioBackup`] - Scheduled e-mail backup settings
//! - [`GenerateShareUrlRequest`] - Public link request
//!
//! ### Client Types
//! - [`LoginRequest`] - Credentials for `/user/login`
//! - [`ClientInfo`] - Session info with the bearer token

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Client types
    ClientInfo,
    ClientUser,
    LoginRequest,
    // Portfolio types
    CreatePortfolioRequest,
    GenerateShareUrlRequest,
    IisType,
    PortfolioAccountType,
    PortfolioBackup,
    PortfolioParams,
    UpdatePortfolioRequest,
};
