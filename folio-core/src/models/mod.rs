//! Domain models exchanged with the portfolio API.

mod client;
mod portfolio;

pub use client::{ClientInfo, ClientUser, LoginRequest};
pub use portfolio::{
    CreatePortfolioRequest, GenerateShareUrlRequest, IisType, PortfolioAccountType,
    PortfolioBackup, PortfolioParams, UpdatePortfolioRequest,
};
