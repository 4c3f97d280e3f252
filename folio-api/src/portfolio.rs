//! Portfolio service.

use folio_core::{
    CoreError, CreatePortfolioRequest, GenerateShareUrlRequest, PortfolioBackup, PortfolioParams,
    UpdatePortfolioRequest,
};
use folio_transport::{Body, Http, Payload};
use tracing::{debug, info, instrument};

use crate::error::ApiError;

/// Path segment shared by the portfolio endpoints.
pub const ENDPOINT_BASE: &str = "portfolio-info";

fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

fn backup_path(user_id: &str) -> String {
    format!("/portfolios/{}/backup", segment(user_id))
}

/// Portfolio operations.
#[derive(Debug, Clone)]
pub struct PortfolioService {
    http: Http,
}

impl PortfolioService {
    /// Creates the service on top of a transport.
    pub fn new(http: Http) -> Self {
        Self { http }
    }

    /// Returns the user's portfolios.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the payload is not a list of
    /// portfolios.
    #[instrument(skip(self))]
    pub async fn get_portfolios(&self) -> Result<Vec<PortfolioParams>, ApiError> {
        let portfolios: Option<Vec<PortfolioParams>> = self
            .http
            .get(&format!("/{ENDPOINT_BASE}"), None, None)
            .await?
            .into_optional_json()?;

        let portfolios = portfolios.unwrap_or_default();
        debug!(count = portfolios.len(), "Loaded portfolios");
        Ok(portfolios)
    }

    /// Updates the portfolio if it has an id, creates it otherwise.
    ///
    /// # Errors
    ///
    /// See [`Self::create_portfolio`] and [`Self::update_portfolio`].
    pub async fn create_or_update_portfolio(
        &self,
        portfolio: &PortfolioParams,
    ) -> Result<PortfolioParams, ApiError> {
        if portfolio.is_persisted() {
            self.update_portfolio(portfolio).await
        } else {
            self.create_portfolio(portfolio).await
        }
    }

    /// Creates a portfolio and returns it as stored.
    ///
    /// # Errors
    ///
    /// Fails without a request if the account type is missing.
    #[instrument(skip(self, portfolio), fields(name = %portfolio.name))]
    pub async fn create_portfolio(&self, portfolio: &PortfolioParams) -> Result<PortfolioParams, ApiError> {
        let request = CreatePortfolioRequest::try_from(portfolio)?;
        let created: PortfolioParams = self
            .http
            .post(&format!("/{ENDPOINT_BASE}"), Some(Body::json(&request)?), None, None)
            .await?
            .into_json()?;

        info!(id = ?created.id, "Portfolio created");
        Ok(created)
    }

    /// Updates a portfolio and returns it as stored.
    ///
    /// # Errors
    ///
    /// Fails without a request if the id or account type is missing.
    #[instrument(skip(self, portfolio), fields(id = ?portfolio.id))]
    pub async fn update_portfolio(&self, portfolio: &PortfolioParams) -> Result<PortfolioParams, ApiError> {
        let request = UpdatePortfolioRequest::try_from(portfolio)?;
        let updated = self
            .http
            .put(&format!("/{ENDPOINT_BASE}"), Some(Body::json(&request)?), None)
            .await?
            .into_json()?;
        Ok(updated)
    }

    /// Deletes a portfolio.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self))]
    pub async fn delete_portfolio(&self, portfolio_id: &str) -> Result<(), ApiError> {
        self.http
            .delete(&format!("/{ENDPOINT_BASE}/{}", segment(portfolio_id)), None, None)
            .await?;
        info!(portfolio_id, "Portfolio deleted");
        Ok(())
    }

    /// Sets the note for `ticker` and sends the whole notes map.
    ///
    /// `portfolio` is only changed once the server accepts the notes.
    ///
    /// # Errors
    ///
    /// Fails without a request if the portfolio has no id.
    #[instrument(skip(self, portfolio, note), fields(id = ?portfolio.id))]
    pub async fn update_share_notes(
        &self,
        portfolio: &mut PortfolioParams,
        ticker: &str,
        note: &str,
    ) -> Result<(), ApiError> {
        let id = portfolio
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(CoreError::MissingField("id"))?;

        let mut notes = portfolio.share_notes.clone();
        notes.insert(ticker.to_string(), note.to_string());

        self.http
            .put(
                &format!("/{ENDPOINT_BASE}/{}/shareNotes", segment(id)),
                Some(Body::json(&notes)?),
                None,
            )
            .await?;

        portfolio.share_notes = notes;
        Ok(())
    }

    /// Asks the server to copy a portfolio and returns the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the payload is not a portfolio.
    #[instrument(skip(self))]
    pub async fn create_portfolio_copy(&self, portfolio_id: &str) -> Result<PortfolioParams, ApiError> {
        let copy = self
            .http
            .get(&format!("/{ENDPOINT_BASE}/copy/{}", segment(portfolio_id)), None, None)
            .await?
            .into_json()?;
        Ok(copy)
    }

    /// Returns the backup schedule of a user, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the payload is not a backup.
    #[instrument(skip(self))]
    pub async fn get_portfolio_backup(&self, user_id: &str) -> Result<Option<PortfolioBackup>, ApiError> {
        let backup = self
            .http
            .get(&backup_path(user_id), None, None)
            .await?
            .into_optional_json()?;
        Ok(backup)
    }

    /// Creates or replaces the backup schedule of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    #[instrument(skip(self, backup))]
    pub async fn save_or_update_portfolio_backup(
        &self,
        user_id: &str,
        backup: &PortfolioBackup,
    ) -> Result<(), ApiError> {
        self.http
            .post(&backup_path(user_id), Some(Body::json(backup)?), None, None)
            .await?;
        Ok(())
    }

    /// Returns a public link to a portfolio.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::UnexpectedPayload`] if the server sends no
    /// link.
    #[instrument(skip(self, request), fields(id = %request.id))]
    pub async fn get_portfolio_share_url(&self, request: &GenerateShareUrlRequest) -> Result<String, ApiError> {
        let payload = self
            .http
            .post(
                &format!("/{ENDPOINT_BASE}/public-url"),
                Some(Body::json(request)?),
                None,
                None,
            )
            .await?;

        match payload {
            Payload::Text(_) | Payload::Json(_) => Ok(payload.into_text()?),
            other => Err(ApiError::UnexpectedPayload(format!(
                "expected share url, got {}",
                other.kind()
            ))),
        }
    }
}
