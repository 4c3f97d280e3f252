//! Portfolio-related types.
//!
//! This module contains the portfolio payloads of the `portfolio-info` API:
//! - [`PortfolioAccountType`] / [`IisType`] - Account classification
//! - [`PortfolioParams`] - Portfolio settings as returned by the API
//! - [`CreatePortfolioRequest`] / [`UpdatePortfolioRequest`] - Write payloads
//! - [`PortfolioBackup`] - Scheduled backup settings
//! - [`GenerateShareUrlRequest`] - Public link request

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

// ============================================================================
// Account Type
// ============================================================================

/// Portfolio account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioAccountType {
    /// Regular brokerage account.
    Brokerage,
    /// Individual investment account.
    Iis,
}

impl PortfolioAccountType {
    /// Returns the wire name of this account type.
    pub fn value(&self) -> &'static str {
        match self {
            Self::Brokerage => "BROKERAGE",
            Self::Iis => "IIS",
        }
    }

    /// Returns the human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Brokerage => "Brokerage",
            Self::Iis => "Individual investment account",
        }
    }

    /// Returns all account types.
    pub fn all() -> &'static [PortfolioAccountType] {
        &[Self::Brokerage, Self::Iis]
    }
}

impl FromStr for PortfolioAccountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|t| t.value() == s)
            .copied()
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "account type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PortfolioAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

// ============================================================================
// IIS Type
// ============================================================================

/// Tax deduction flavour of an individual investment account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IisType {
    /// Deduction on contributions.
    TypeA,
    /// Deduction on income.
    TypeB,
}

impl IisType {
    /// Returns the wire name of this IIS type.
    pub fn value(&self) -> &'static str {
        match self {
            Self::TypeA => "TYPE_A",
            Self::TypeB => "TYPE_B",
        }
    }

    /// Returns the human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::TypeA => "Deduction on contributions",
            Self::TypeB => "Deduction on income",
        }
    }

    /// Returns all IIS types.
    pub fn all() -> &'static [IisType] {
        &[Self::TypeA, Self::TypeB]
    }
}

impl FromStr for IisType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|t| t.value() == s)
            .copied()
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "IIS type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for IisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

/// The API sends enum names as strings and uses `null` or `""` for "unset".
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = CoreError>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Portfolio Params
// ============================================================================

/// Portfolio settings as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct PortfolioParams {
    /// Portfolio identifier (absent for portfolios not yet created).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Portfolio name.
    pub name: String,
    /// Public access to the portfolio.
    #[serde(default)]
    pub access: bool,
    /// Dividends section visible in the public portfolio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividends_access: Option<bool>,
    /// Trades section visible in the public portfolio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trades_access: Option<bool>,
    /// Value chart visible in the public portfolio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_data_access: Option<bool>,
    /// Dashboard visible in the public portfolio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_access: Option<bool>,
    /// Professional mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_mode: Option<bool>,
    /// Broker identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker_id: Option<u64>,
    /// Main portfolio currency.
    pub view_currency: String,
    /// Alternative portfolio currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_view_currency: Option<String>,
    /// Fixed fee in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_fee: Option<String>,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Account opening date, as sent by the API.
    pub open_date: String,
    /// Whether the portfolio takes part in the combined calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined: Option<bool>,
    /// Per-ticker notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub share_notes: HashMap<String, String>,
    /// Account type.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub account_type: Option<PortfolioAccountType>,
    /// IIS type, only meaningful for IIS accounts.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub iis_type: Option<IisType>,
}

impl PortfolioParams {
    /// Returns true if this portfolio has already been created on the server.
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

// ============================================================================
// Write Requests
// ============================================================================

/// Payload for creating a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    /// Portfolio name.
    pub name: String,
    /// Public access flag, sent as `0` or `1`.
    pub access: u8,
    /// Account opening date.
    pub open_date: String,
    /// Broker identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_id: Option<u64>,
    /// Professional mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_mode: Option<bool>,
    /// Main portfolio currency.
    pub view_currency: String,
    /// Alternative portfolio currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_view_currency: Option<String>,
    /// Fixed fee in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_fee: Option<String>,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Account type.
    pub account_type: PortfolioAccountType,
    /// IIS type, `null` for brokerage accounts.
    pub iis_type: Option<IisType>,
}

impl TryFrom<&PortfolioParams> for CreatePortfolioRequest {
    type Error = CoreError;

    fn try_from(p: &PortfolioParams) -> Result<Self, Self::Error> {
        Ok(Self {
            name: p.name.clone(),
            access: u8::from(p.access),
            open_date: p.open_date.clone(),
            broker_id: p.broker_id,
            professional_mode: p.professional_mode,
            view_currency: p.view_currency.clone(),
            alternative_view_currency: p.alternative_view_currency.clone(),
            fix_fee: p.fix_fee.clone(),
            note: p.note.clone(),
            account_type: p.account_type.ok_or(CoreError::MissingField("accountType"))?,
            iis_type: p.iis_type,
        })
    }
}

/// Payload for updating a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct UpdatePortfolioRequest {
    /// Portfolio identifier.
    pub id: String,
    /// Portfolio name.
    pub name: String,
    /// Public access flag.
    pub access: bool,
    /// Dividends section visible in the public portfolio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividends_access: Option<bool>,
    /// Trades section visible in the public portfolio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trades_access: Option<bool>,
    /// Value chart visible in the public portfolio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_data_access: Option<bool>,
    /// Dashboard visible in the public portfolio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_access: Option<bool>,
    /// Professional mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_mode: Option<bool>,
    /// Broker identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_id: Option<u64>,
    /// Main portfolio currency.
    pub view_currency: String,
    /// Alternative portfolio currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_view_currency: Option<String>,
    /// Fixed fee in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_fee: Option<String>,
    /// Free-form note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Account opening date.
    pub open_date: String,
    /// Combined calculation flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined: Option<bool>,
    /// Account type.
    pub account_type: PortfolioAccountType,
    /// IIS type, `null` for brokerage accounts.
    pub iis_type: Option<IisType>,
}

impl TryFrom<&PortfolioParams> for UpdatePortfolioRequest {
    type Error = CoreError;

    fn try_from(p: &PortfolioParams) -> Result<Self, Self::Error> {
        let id = p
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(CoreError::MissingField("id"))?;

        Ok(Self {
            id,
            name: p.name.clone(),
            access: p.access,
            dividends_access: p.dividends_access,
            trades_access: p.trades_access,
            line_data_access: p.line_data_access,
            dashboard_access: p.dashboard_access,
            professional_mode: p.professional_mode,
            broker_id: p.broker_id,
            view_currency: p.view_currency.clone(),
            alternative_view_currency: p.alternative_view_currency.clone(),
            fix_fee: p.fix_fee.clone(),
            note: p.note.clone(),
            open_date: p.open_date.clone(),
            combined: p.combined,
            account_type: p.account_type.ok_or(CoreError::MissingField("accountType"))?,
            iis_type: p.iis_type,
        })
    }
}

// ============================================================================
// Backup
// ============================================================================

/// Scheduled portfolio backup settings.
///
/// Days are encoded the way the API stores them: Monday is `2` and Sunday
/// is `8`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioBackup {
    /// Backup identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Backup days (Monday = 2 .. Sunday = 8).
    #[serde(default)]
    pub days: Vec<u8>,
    /// Portfolios included in the backup.
    #[serde(default)]
    pub portfolio_ids: Vec<String>,
}

impl PortfolioBackup {
    /// Offset between `Weekday::num_days_from_monday` and the API encoding.
    const DAY_OFFSET: u8 = 2;

    /// Creates backup settings from weekdays.
    pub fn from_weekdays(
        id: Option<String>,
        weekdays: &[Weekday],
        portfolio_ids: Vec<String>,
    ) -> Self {
        let days = weekdays
            .iter()
            .map(|day| {
                // num_days_from_monday is always in 0..7
                #[allow(clippy::cast_possible_truncation)]
                let index = day.num_days_from_monday() as u8;
                index + Self::DAY_OFFSET
            })
            .collect();

        Self {
            id,
            days,
            portfolio_ids,
        }
    }

    /// Decodes the backup days into weekdays.
    ///
    /// # Errors
    ///
    /// Returns an error if a day is outside the `2..=8` range.
    pub fn weekdays(&self) -> Result<Vec<Weekday>, CoreError> {
        self.days
            .iter()
            .map(|&day| {
                day.checked_sub(Self::DAY_OFFSET)
                    .and_then(|index| Weekday::try_from(index).ok())
                    .ok_or_else(|| CoreError::InvalidData(format!("backup day out of range: {day}")))
            })
            .collect()
    }
}

// ============================================================================
// Share URL
// ============================================================================

/// Request for a public portfolio link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateShareUrlRequest {
    /// Portfolio identifier.
    pub id: String,
    /// Link expiration date.
    pub expired_date: String,
    /// Kind of public access.
    pub share_portfolio_type: String,
    /// User name in the system.
    pub user_name: String,
}
