//! CLI command implementations.

pub mod config;
pub mod login;
pub mod portfolios;
pub mod request;
pub mod token;
