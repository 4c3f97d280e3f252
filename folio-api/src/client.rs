//! Client session service.

use folio_core::{ClientInfo, LoginRequest};
use folio_transport::{Body, Http, TOKEN_KEY};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::error::ApiError;

/// Login endpoint.
pub const LOGIN_PATH: &str = "/user/login";

/// Logs in and keeps the session for the lifetime of the service.
#[derive(Debug)]
pub struct ClientService {
    http: Http,
    client_info: RwLock<Option<ClientInfo>>,
}

impl ClientService {
    /// Creates the service on top of a transport.
    pub fn new(http: Http) -> Self {
        Self {
            http,
            client_info: RwLock::new(None),
        }
    }

    /// Logs in, or returns the session from an earlier login.
    ///
    /// The token is written to storage under [`TOKEN_KEY`], so every later
    /// call through the same transport is authenticated. An earlier session
    /// is reused only while its token is still stored; once the transport
    /// clears it on a 401, the next call logs in again.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the token cannot be stored.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<ClientInfo, ApiError> {
        if let Some(info) = self.client_info.read().await.clone() {
            if self.token_matches(&info).await? {
                return Ok(info);
            }
        }

        let mut cached = self.client_info.write().await;
        if let Some(info) = cached.take() {
            if self.token_matches(&info).await? {
                *cached = Some(info.clone());
                return Ok(info);
            }
            debug!("Stored token is gone, dropping cached session");
        }

        let info: ClientInfo = self
            .http
            .post(LOGIN_PATH, Some(Body::json(request)?), None, None)
            .await?
            .into_json()?;

        self.http.storage().set(TOKEN_KEY, &info.token).await?;
        info!(user_id = %info.user.id, "Logged in");

        *cached = Some(info.clone());
        Ok(info)
    }

    /// Returns the cached session, if logged in and its token is still stored.
    pub async fn client_info(&self) -> Option<ClientInfo> {
        let info = self.client_info.read().await.clone()?;
        match self.token_matches(&info).await {
            Ok(true) => Some(info),
            _ => None,
        }
    }

    async fn token_matches(&self, info: &ClientInfo) -> Result<bool, ApiError> {
        let stored = self.http.storage().get(TOKEN_KEY).await?;
        Ok(stored.is_some_and(|token| !token.trim().is_empty() && token == info.token))
    }

    /// Drops the session and the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client_info.write().await.take();
        self.http.storage().delete(TOKEN_KEY).await?;
        info!("Logged out");
        Ok(())
    }
}
