//! Login and logout commands.

use anyhow::Result;
use clap::Args;
use folio_api::ClientService;
use folio_core::LoginRequest;
use serde_json::json;

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Login name or e-mail.
    #[arg(long, short)]
    pub username: String,

    /// Password.
    #[arg(long)]
    pub password: String,
}

/// Runs the login command.
pub async fn run_login(args: &LoginArgs, ctx: &AppContext, cli: &Cli) -> Result<()> {
    let client = ClientService::new(ctx.http()?);
    let info = client
        .login(&LoginRequest::new(args.username.as_str(), args.password.as_str()))
        .await?;

    let display_name = info.user.username.as_deref().unwrap_or(&info.user.id);
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.success(&format!("Logged in as {display_name} ({})", ctx.settings().storage))
            );
        }
        OutputFormat::Json => {
            let output = json!({
                "userId": info.user.id,
                "username": info.user.username,
                "email": info.user.email,
                "storage": ctx.settings().storage,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

/// Runs the logout command.
pub async fn run_logout(ctx: &AppContext, cli: &Cli) -> Result<()> {
    ClientService::new(ctx.http()?).logout().await?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", TextFormatter::new(!cli.no_color).success("Logged out"));
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&json!({"loggedOut": true}))?);
        }
    }

    Ok(())
}
