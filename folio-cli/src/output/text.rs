//! Text output formatting with colors.

use folio_core::{PortfolioBackup, PortfolioParams};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats portfolios as an aligned table, one line per portfolio.
    pub fn format_portfolios(&self, portfolios: &[PortfolioParams]) -> String {
        if portfolios.is_empty() {
            return format!("{}\n", self.dim("No portfolios"));
        }

        let rows: Vec<[String; 5]> = portfolios
            .iter()
            .map(|p| {
                [
                    p.id.clone().unwrap_or_else(|| "-".to_string()),
                    p.name.clone(),
                    p.account_type
                        .map_or_else(|| "-".to_string(), |t| t.value().to_string()),
                    p.view_currency.clone(),
                    if p.access { "public" } else { "private" }.to_string(),
                ]
            })
            .collect();

        let header = ["ID", "NAME", "TYPE", "CURRENCY", "ACCESS"];
        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.bold(&Self::row(&header.map(String::from), &widths)));
        out.push('\n');
        for row in &rows {
            let line = Self::row(row, &widths);
            if row[4] == "public" {
                out.push_str(&self.yellow(&line));
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out
    }

    /// Formats a backup schedule.
    pub fn format_backup(&self, backup: Option<&PortfolioBackup>) -> String {
        let Some(backup) = backup else {
            return format!("{}\n", self.dim("No backup configured"));
        };

        let days = match backup.weekdays() {
            Ok(days) if days.is_empty() => "none".to_string(),
            Ok(days) => days.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            Err(_) => format!("{:?}", backup.days),
        };
        let portfolios = if backup.portfolio_ids.is_empty() {
            "none".to_string()
        } else {
            backup.portfolio_ids.join(", ")
        };

        format!(
            "{}\n  Days:       {days}\n  Portfolios: {portfolios}\n",
            self.bold("Portfolio backup")
        )
    }

    /// Formats a success message.
    pub fn success(&self, text: &str) -> String {
        format!("{} {text}", self.green("✓"))
    }

    /// Dims secondary text.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn row(cells: &[String; 5], widths: &[usize; 5]) -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }
}
