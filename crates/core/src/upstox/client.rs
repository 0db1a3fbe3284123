//! reqwest-backed transport for the Upstox REST API.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;

use super::config::ProviderConfig;
use super::models::{TokenExchangeForm, TokenResponse};
use super::transport::{ProviderCall, ProviderTransport};
use crate::errors::{Error, Result};

/// Longest slice of a provider body that ends up in log lines.
const LOG_BODY_LIMIT: usize = 200;

#[derive(Debug, Clone)]
pub struct UpstoxClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstoxClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn truncated(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[async_trait]
impl ProviderTransport for UpstoxClient {
    async fn get_json(&self, call: ProviderCall) -> Result<Value> {
        let url = call.url(&self.base_url)?;
        debug!("[Upstox] GET {}", url);

        let auth_header = HeaderValue::from_str(&format!("Bearer {}", call.bearer))
            .map_err(|e| Error::Unexpected(format!("Invalid access token format: {}", e)))?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth_header)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                "[Upstox] API error {} for {}: {}",
                status.as_u16(),
                call.path,
                truncated(&body)
            );
            return Err(Error::Provider {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("[Upstox] Non-JSON success body for {}: {}", call.path, e);
            Error::Provider {
                status: status.as_u16(),
                body,
            }
        })
    }

    async fn exchange_token(&self, form: TokenExchangeForm) -> Result<TokenResponse> {
        let url = format!("{}/login/authorization/token", self.base_url);
        debug!("[Upstox] Exchanging authorization code at {}", url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&form.fields())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                "[Upstox] Token exchange failed with {}: {}",
                status.as_u16(),
                truncated(&body)
            );
            return Err(Error::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
            error!("[Upstox] Token response could not be parsed: {}", e);
            Error::ExchangeFailed {
                status: status.as_u16(),
                body,
            }
        })
    }
}
