//! Token command - inspect or change the stored bearer token.

use anyhow::Result;
use clap::{Args, Subcommand};
use folio_transport::TOKEN_KEY;
use serde_json::json;

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the token command.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: TokenAction,
}

/// Token subcommands.
#[derive(Subcommand)]
pub enum TokenAction {
    /// Show whether a token is stored.
    Show {
        /// Print the token itself.
        #[arg(long)]
        reveal: bool,
    },

    /// Store a token obtained elsewhere.
    Set {
        /// Bearer token.
        token: String,
    },

    /// Remove the stored token.
    Clear,
}

/// Runs the token command.
pub async fn run(args: &TokenArgs, ctx: &AppContext, cli: &Cli) -> Result<()> {
    let storage = ctx.storage();
    let formatter = TextFormatter::new(!cli.no_color);

    match &args.action {
        TokenAction::Show { reveal } => {
            let token = storage.get(TOKEN_KEY).await?;
            match cli.format {
                OutputFormat::Text => match &token {
                    Some(t) if *reveal => println!("{t}"),
                    Some(t) => println!("Token stored ({})", mask(t)),
                    None => println!("{}", formatter.dim("No token stored")),
                },
                OutputFormat::Json => {
                    let shown = token.as_deref().map(|t| if *reveal { t.to_string() } else { mask(t) });
                    let output = json!({
                        "stored": token.is_some(),
                        "token": shown,
                        "storage": ctx.settings().storage,
                    });
                    println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
                }
            }
        }
        TokenAction::Set { token } => {
            let token = token.trim();
            anyhow::ensure!(!token.is_empty(), "Token must not be empty");
            storage.set(TOKEN_KEY, token).await?;
            if !cli.quiet {
                println!("{}", formatter.success("Token stored"));
            }
        }
        TokenAction::Clear => {
            storage.delete(TOKEN_KEY).await?;
            if !cli.quiet {
                println!("{}", formatter.success("Token cleared"));
            }
        }
    }

    Ok(())
}

/// Masks all but the last four characters of a token.
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}
