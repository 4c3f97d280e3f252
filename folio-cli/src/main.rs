// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Folio CLI - talk to the Folio portfolio API from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in; the token is kept in the configured storage backend
//! folio login --username alice --password secret
//!
//! # List portfolios
//! folio portfolios list
//!
//! # Raw request with repeated query keys
//! folio request get /quotes --param tickers=SBER --param tickers=GAZP
//!
//! # JSON output
//! folio --format json --pretty portfolios list
//!
//! # Point at another server
//! folio config set-origin https://folio.example.com
//! ```

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use folio_api::ApiError;
use folio_store::{LogLevel, SettingsStore};
use folio_transport::TransportError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{config, login, portfolios, request, token};
use context::AppContext;

// ============================================================================
// CLI Definition
// ============================================================================

/// Folio CLI - portfolio API client.
#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Portfolio API client")]
#[command(long_about = r#"
Folio talks to the portfolio API at <origin>/api.

The origin comes from --origin, then FOLIO_API_ORIGIN, then the settings
file. The bearer token is kept in the storage backend chosen in settings
(keychain, file or memory).

Examples:
  folio login --username alice --password secret
  folio portfolios list
  folio request get /portfolio-info
  folio --format json config show
"#)]
#[command(version)]
#[command(author = "Folio Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Application origin, e.g. `https://folio.example.com`.
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token.
    Login(login::LoginArgs),

    /// Forget the session token.
    Logout,

    /// Inspect or change the stored token.
    Token(token::TokenArgs),

    /// Send a raw request.
    #[command(visible_alias = "r")]
    Request(request::RequestArgs),

    /// Manage portfolios.
    #[command(visible_alias = "p")]
    Portfolios(portfolios::PortfoliosArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The server rejected the session; log in again.
    AccessDenied = 2,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        let denied = err.chain().any(|cause| {
            cause
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_access_denied)
                || cause
                    .downcast_ref::<TransportError>()
                    .is_some_and(TransportError::is_access_denied)
        });

        if denied {
            ExitCode::AccessDenied
        } else {
            ExitCode::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("folio=debug,folio_transport=debug,folio_api=debug,folio_store=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "folio={level},folio_transport={level},folio_api={level},folio_store={level}"
            ))
        })
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SettingsStore::load_default().await?;
    setup_logging(cli.verbose, cli.quiet, store.get().await.log_level);

    let ctx = AppContext::new(store, cli.origin.clone()).await;

    let result = match &cli.command {
        Commands::Login(args) => login::run_login(args, &ctx, &cli).await,
        Commands::Logout => login::run_logout(&ctx, &cli).await,
        Commands::Token(args) => token::run(args, &ctx, &cli).await,
        Commands::Request(args) => request::run(args, &ctx, &cli).await,
        Commands::Portfolios(args) => portfolios::run(args, &ctx, &cli).await,
        Commands::Config(args) => config::run(args, &ctx, &cli).await,
    };

    if let Err(e) = result {
        let code = ExitCode::for_error(&e);
        if !cli.quiet {
            eprintln!("Error: {e}");
            if matches!(code, ExitCode::AccessDenied) {
                eprintln!("Run `folio login` to start a new session.");
            }
        }
        std::process::exit(code as i32);
    }

    Ok(())
}
