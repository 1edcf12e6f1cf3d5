//! Password-grant authentication against the Copernicus identity provider.
//!
//! The [`Authenticator`] owns the current [`AccessToken`] and hands out bearer strings
//! through [`Authenticator::bearer`], which re-runs the password grant whenever the
//! cached token is missing or about to expire.

use crate::config::ResolvedConfig;
use crate::constants::TOKEN_EXPIRY_MARGIN_SECS;
use crate::errors::{AppError, AppResult};
use crate::models::{AccessToken, Credentials};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

pub struct Authenticator {
    client: reqwest::Client,
    identity_url: String,
    client_id: String,
    credentials: Credentials,
    token: Option<AccessToken>,
}

impl Authenticator {
    pub fn new(client: reqwest::Client, config: &ResolvedConfig, credentials: Credentials) -> Self {
        Self {
            client,
            identity_url: config.identity_url.clone(),
            client_id: config.client_id.clone(),
            credentials,
            token: None,
        }
    }

    /// Creates an authenticator and acquires the first token immediately.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the identity provider rejects the credentials
    /// or cannot be reached.
    pub async fn login(
        client: reqwest::Client,
        config: &ResolvedConfig,
        credentials: Credentials,
    ) -> AppResult<Self> {
        let mut authenticator = Self::new(client, config, credentials);
        authenticator.bearer().await?;
        Ok(authenticator)
    }

    /// Performs a single password-grant token request.
    ///
    /// No retry is attempted. On a non-success status the server body is returned
    /// inside the error so the cause (bad password, disabled account, ...) is visible.
    pub async fn authenticate(&self) -> AppResult<AccessToken> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("username", self.credentials.username()),
            ("password", self.credentials.password()),
            ("grant_type", "password"),
        ];

        debug!(
            identity_url = %self.identity_url,
            username = self.credentials.username(),
            "Requesting access token"
        );

        let response = self
            .client
            .post(&self.identity_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Authentication {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                body: format!("Identity provider unreachable: {e}"),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::Authentication {
            status: status.as_u16(),
            body: format!("Failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            return Err(AppError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AppError::Authentication {
                status: status.as_u16(),
                body: format!("Malformed token response ({e}): {body}"),
            })?;

        if parsed.access_token.is_empty() {
            return Err(AppError::Authentication {
                status: status.as_u16(),
                body: format!("Token response has no access_token: {body}"),
            });
        }

        info!(expires_in = ?parsed.expires_in, "Access token acquired");
        Ok(AccessToken::new(parsed.access_token, parsed.expires_in))
    }

    /// Returns a bearer string valid for at least the refresh margin.
    pub async fn bearer(&mut self) -> AppResult<String> {
        let margin = Duration::from_secs(TOKEN_EXPIRY_MARGIN_SECS);
        match &self.token {
            Some(token) if !token.is_expired(margin) => return Ok(token.secret().to_string()),
            Some(_) => debug!("Access token expired or about to expire, refreshing"),
            None => {}
        }

        let token = self.authenticate().await?;
        let secret = token.secret().to_string();
        self.token = Some(token);
        Ok(secret)
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }
}
