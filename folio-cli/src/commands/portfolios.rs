//! Portfolios command - list, delete, copy and back up portfolios.

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::{Args, Subcommand};
use folio_api::PortfolioService;
use folio_core::PortfolioBackup;
use serde_json::json;

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the portfolios command.
#[derive(Args)]
pub struct PortfoliosArgs {
    #[command(subcommand)]
    pub action: PortfoliosAction,
}

/// Portfolio subcommands.
#[derive(Subcommand)]
pub enum PortfoliosAction {
    /// List portfolios.
    #[command(visible_alias = "ls")]
    List,

    /// Delete a portfolio.
    Delete {
        /// Portfolio id.
        id: String,
    },

    /// Create a copy of a portfolio.
    Copy {
        /// Portfolio id.
        id: String,
    },

    /// Show or change the backup schedule.
    Backup(BackupArgs),
}

/// Arguments for the backup subcommand.
#[derive(Args)]
pub struct BackupArgs {
    /// User id owning the backup.
    #[arg(long, short)]
    pub user: String,

    /// Backup days, comma-separated (mon,tue,...). Omit to show the schedule.
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<String>,

    /// Portfolio to include; repeat for several.
    #[arg(long = "portfolio")]
    pub portfolios: Vec<String>,
}

/// Runs the portfolios command.
pub async fn run(args: &PortfoliosArgs, ctx: &AppContext, cli: &Cli) -> Result<()> {
    let service = PortfolioService::new(ctx.http()?);
    let formatter = TextFormatter::new(!cli.no_color);
    let json_out = JsonFormatter::new(cli.pretty);

    match &args.action {
        PortfoliosAction::List => {
            let portfolios = service.get_portfolios().await?;
            match cli.format {
                OutputFormat::Text => print!("{}", formatter.format_portfolios(&portfolios)),
                OutputFormat::Json => println!("{}", json_out.format(&portfolios)?),
            }
        }
        PortfoliosAction::Delete { id } => {
            service.delete_portfolio(id).await?;
            match cli.format {
                OutputFormat::Text => println!("{}", formatter.success(&format!("Deleted portfolio {id}"))),
                OutputFormat::Json => println!("{}", json_out.format(&json!({"deleted": id}))?),
            }
        }
        PortfoliosAction::Copy { id } => {
            let copy = service.create_portfolio_copy(id).await?;
            match cli.format {
                OutputFormat::Text => print!("{}", formatter.format_portfolios(std::slice::from_ref(&copy))),
                OutputFormat::Json => println!("{}", json_out.format(&copy)?),
            }
        }
        PortfoliosAction::Backup(backup_args) => {
            if backup_args.days.is_empty() {
                let backup = service.get_portfolio_backup(&backup_args.user).await?;
                match cli.format {
                    OutputFormat::Text => print!("{}", formatter.format_backup(backup.as_ref())),
                    OutputFormat::Json => println!("{}", json_out.format(&backup)?),
                }
            } else {
                let weekdays = parse_weekdays(&backup_args.days)?;
                let existing = service.get_portfolio_backup(&backup_args.user).await?;
                let backup = PortfolioBackup::from_weekdays(
                    existing.and_then(|b| b.id),
                    &weekdays,
                    backup_args.portfolios.clone(),
                );
                service
                    .save_or_update_portfolio_backup(&backup_args.user, &backup)
                    .await?;
                match cli.format {
                    OutputFormat::Text => println!("{}", formatter.success("Backup schedule saved")),
                    OutputFormat::Json => println!("{}", json_out.format(&backup)?),
                }
            }
        }
    }

    Ok(())
}

/// Parses weekday names such as `mon` or `Friday`.
pub fn parse_weekdays(raw: &[String]) -> Result<Vec<Weekday>> {
    raw.iter()
        .map(|day| {
            day.trim()
                .parse::<Weekday>()
                .ok()
                .with_context(|| format!("Unknown weekday: {day}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weekdays() {
        let days = parse_weekdays(&["mon".to_string(), " Friday".to_string()]).unwrap();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Fri]);
        assert!(parse_weekdays(&["someday".to_string()]).is_err());
    }
}
