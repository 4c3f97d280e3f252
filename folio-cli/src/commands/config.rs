//! Config command - manage configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use folio_store::{default_config_dir, default_storage_path, StorageBackend, ORIGIN_ENV_VAR};
use folio_transport::Http;
use tracing::info;

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the application origin.
    SetOrigin {
        /// Origin URL, e.g. `https://folio.example.com`.
        origin: String,
    },

    /// Choose where the token is stored.
    SetStorage {
        /// Backend: keychain, file or memory.
        backend: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, ctx: &AppContext, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(ctx, cli).await,
        ConfigAction::Path => show_paths(ctx, cli),
        ConfigAction::SetOrigin { origin } => set_origin(origin, ctx, cli).await,
        ConfigAction::SetStorage { backend } => set_storage(backend, ctx, cli).await,
        ConfigAction::Reset => reset_config(ctx, cli).await,
    }
}

async fn show_config(ctx: &AppContext, cli: &Cli) -> Result<()> {
    let saved = ctx.store().get().await;
    let effective = ctx.settings();

    match cli.format {
        OutputFormat::Text => {
            println!("Folio Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API origin:  {}", effective.api_origin);
            if effective.api_origin != saved.api_origin {
                println!(
                    "             (saved: {}, overridden by --origin or {ORIGIN_ENV_VAR})",
                    saved.api_origin
                );
            }
            println!("Storage:     {}", effective.storage);
            println!("Log level:   {}", effective.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(effective)?);
        }
    }

    Ok(())
}

fn show_paths(ctx: &AppContext, cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = ctx.store().path();
    let storage_path = default_storage_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Storage file:  {}", storage_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "storage_file": storage_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_origin(origin: &str, ctx: &AppContext, cli: &Cli) -> Result<()> {
    // The builder normalizes the origin and rejects anything unusable
    let normalized = Http::builder(origin)
        .build()
        .with_context(|| format!("Invalid origin: {origin}"))?
        .origin();

    let store = ctx.store();
    store.update(|s| s.api_origin.clone_from(&normalized)).await;
    store.save().await?;

    info!(origin = %normalized, "API origin updated");
    if !cli.quiet {
        println!(
            "{}",
            TextFormatter::new(!cli.no_color).success(&format!("API origin set to: {normalized}"))
        );
    }

    Ok(())
}

async fn set_storage(backend: &str, ctx: &AppContext, cli: &Cli) -> Result<()> {
    let backend: StorageBackend = backend.parse()?;

    let store = ctx.store();
    store.update(|s| s.storage = backend).await;
    store.save().await?;

    info!(storage = %backend, "Storage backend updated");
    if !cli.quiet {
        println!(
            "{}",
            TextFormatter::new(!cli.no_color).success(&format!("Token storage set to: {backend}"))
        );
    }

    Ok(())
}

async fn reset_config(ctx: &AppContext, cli: &Cli) -> Result<()> {
    ctx.store().reset().await?;

    info!(path = %ctx.store().path().display(), "Settings reset");
    if !cli.quiet {
        println!("Configuration reset to defaults");
    }

    Ok(())
}
