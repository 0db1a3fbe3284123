//! Authorization-code exchange and credential issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::credentials::{CredentialStoreTrait, NewCredential};
use crate::errors::{Error, Result, ValidationError};
use crate::upstox::{ProviderConfig, ProviderTransport, TokenExchangeForm};

/// Result of a successful exchange as reported to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOutcome {
    pub success: bool,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Trades a one-time authorization code for a token and replaces the stored
/// credential with it.
#[derive(Clone)]
pub struct AuthorizationExchanger {
    config: Arc<ProviderConfig>,
    transport: Arc<dyn ProviderTransport>,
    store: Arc<dyn CredentialStoreTrait>,
}

impl AuthorizationExchanger {
    pub fn new(
        config: Arc<ProviderConfig>,
        transport: Arc<dyn ProviderTransport>,
        store: Arc<dyn CredentialStoreTrait>,
    ) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    pub async fn exchange_code(&self, code: &str) -> Result<ExchangeOutcome> {
        let oauth = self.config.oauth_client().inspect_err(|e| {
            error!("[Upstox] Cannot exchange authorization code: {}", e);
        })?;

        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::MissingField("code").into());
        }

        info!("[Upstox] Exchanging authorization code for access token");
        let form = TokenExchangeForm {
            code: code.to_string(),
            client_id: oauth.client_id.to_string(),
            client_secret: oauth.client_secret.to_string(),
            redirect_uri: oauth.redirect_uri.to_string(),
        };
        let token = self.transport.exchange_token(form).await?;

        if token.access_token.trim().is_empty() {
            error!("[Upstox] Token response carried no access token");
            return Err(Error::ExchangeFailed {
                status: 200,
                body: "Token response has an empty access_token".to_string(),
            });
        }
        let expires_at = Duration::try_seconds(token.lifetime_secs())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                error!("[Upstox] Token lifetime out of range: {:?}", token.expires_in);
                Error::ExchangeFailed {
                    status: 200,
                    body: format!("expires_in out of range: {:?}", token.expires_in),
                }
            })?;
        let stored = self
            .store
            .put(NewCredential {
                access_token: token.access_token,
                refresh_token: token.refresh_token,
                expires_at,
            })
            .await?;
        info!(
            "[Upstox] Access token stored (id {}), expires at {}",
            stored.id,
            stored.expires_at.to_rfc3339()
        );

        Ok(ExchangeOutcome {
            success: true,
            message: "Authentication successful".to_string(),
            expires_at: stored.expires_at,
        })
    }

    /// Consent-dialog URL the browser is sent to in order to start the flow.
    pub fn authorization_url(&self) -> Result<String> {
        let (client_id, redirect_uri) = match (&self.config.client_id, &self.config.redirect_uri) {
            (Some(client_id), Some(redirect_uri)) => (client_id, redirect_uri),
            _ => {
                return Err(Error::Configuration(
                    "UPSTOX_CLIENT_ID and UPSTOX_REDIRECT_URI are required to build the authorization URL"
                        .to_string(),
                ))
            }
        };

        let raw = format!("{}/login/authorization/dialog", self.config.base_url);
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("Invalid UPSTOX_API_BASE_URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri);
        Ok(url.into())
    }
}
