//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use folio_core::{PortfolioAccountType, PortfolioBackup, PortfolioParams};

    fn portfolio(id: &str, name: &str, access: bool) -> PortfolioParams {
        PortfolioParams {
            id: Some(id.to_string()),
            name: name.to_string(),
            access,
            view_currency: "RUB".to_string(),
            open_date: "01.01.2020".to_string(),
            account_type: Some(PortfolioAccountType::Brokerage),
            ..PortfolioParams::default()
        }
    }

    #[test]
    fn test_empty_portfolio_list() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_portfolios(&[]), "No portfolios\n");
    }

    #[test]
    fn test_portfolio_table_is_aligned() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_portfolios(&[
            portfolio("1", "Main", false),
            portfolio("42", "Долгосрок", true),
        ]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID  NAME       TYPE       CURRENCY  ACCESS");
        assert_eq!(lines[1], "1   Main       BROKERAGE  RUB       private");
        assert_eq!(lines[2], "42  Долгосрок  BROKERAGE  RUB       public");
    }

    #[test]
    fn test_colors_only_when_enabled() {
        let plain = TextFormatter::new(false).format_portfolios(&[portfolio("1", "Main", true)]);
        assert!(!plain.contains('\x1b'));

        let colored = TextFormatter::new(true).format_portfolios(&[portfolio("1", "Main", true)]);
        assert!(colored.contains("\x1b[1m"));
        assert!(colored.contains("\x1b[33m"));
    }

    #[test]
    fn test_backup_formatting() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_backup(None), "No backup configured\n");

        let backup = PortfolioBackup {
            id: Some("b1".to_string()),
            days: vec![2, 6],
            portfolio_ids: vec!["p1".to_string()],
        };
        let output = formatter.format_backup(Some(&backup));
        assert!(output.contains("Days:       Mon, Fri"));
        assert!(output.contains("Portfolios: p1"));
    }

    #[test]
    fn test_success_message() {
        assert_eq!(TextFormatter::new(false).success("Done"), "✓ Done");
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;

    #[test]
    fn test_format_pretty() {
        let formatter = JsonFormatter::new(true);
        let output = formatter.format(&serde_json::json!({"key": "value"})).unwrap();
        assert!(output.contains('\n'));
    }

    #[test]
    fn test_format_compact() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format(&serde_json::json!({"key": "value"})).unwrap();
        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_format_slice() {
        let formatter = JsonFormatter::new(false);
        let output = formatter.format(&["a", "b"][..]).unwrap();
        assert_eq!(output, r#"["a","b"]"#);
    }
}
