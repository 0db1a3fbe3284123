//! HTTP client for the gateway's browser-facing endpoints.
//!
//! Mirrors what the dashboard calls: quotes, historical candles, generic
//! market data and the code exchange. Error payloads produced by the server
//! are decoded back into [`Error`] so callers can branch on the variant.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::proxy::CredentialStatus;
use super::requests::{GenericRequest, HistoricalRequest, QuotesRequest};
use crate::auth::ExchangeOutcome;
use crate::errors::{Error, Result, UnauthorizedReason, ValidationError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error payload emitted by the server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorResponse {
    error: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    provider_status: Option<u16>,
    #[serde(default)]
    provider_body: Option<String>,
    #[serde(default)]
    expired_at: Option<DateTime<Utc>>,
}

impl ApiErrorResponse {
    fn into_error(self) -> Error {
        let provider_status = self.provider_status.unwrap_or_default();
        let provider_body = self.provider_body.unwrap_or_default();
        match self.kind.as_deref() {
            Some("configuration_error") => Error::Configuration(self.error),
            Some("unauthorized_absent") => Error::Unauthorized(UnauthorizedReason::Absent),
            Some("unauthorized_expired") => match self.expired_at {
                Some(expired_at) => Error::Unauthorized(UnauthorizedReason::Expired { expired_at }),
                None => Error::Unexpected(format!("Malformed expiry error payload: {}", self.error)),
            },
            Some("exchange_failed") => Error::ExchangeFailed {
                status: provider_status,
                body: provider_body,
            },
            Some("provider_error") => Error::Provider {
                status: provider_status,
                body: provider_body,
            },
            Some("validation_error") => ValidationError::InvalidInput(self.error).into(),
            Some("network_error") => Error::Network(self.error),
            _ => Error::Unexpected(self.error),
        }
    }
}

#[derive(Serialize)]
struct CodeBody<'a> {
    code: &'a str,
}

#[derive(Serialize)]
struct MarketDataBody<'a> {
    endpoint: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    params: &'a BTreeMap<String, String>,
}

/// Client for a running gateway, e.g. `http://localhost:8080/api/v1`.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Gateway] POST {}", url);
        let response = self
            .client
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Gateway] GET {}", url);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(err.into_error());
            }
            return Err(Error::Unexpected(format!(
                "Gateway error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Unexpected(format!("Malformed gateway response: {} - {}", e, body)))
    }

    pub async fn get_quotes(&self, symbols: &[String]) -> Result<Value> {
        self.post("/upstox/quotes", &QuotesRequest::new(symbols.iter().cloned()))
            .await
    }

    pub async fn get_historical_data(&self, request: &HistoricalRequest) -> Result<Value> {
        self.post("/upstox/historical", request).await
    }

    pub async fn get_market_data(&self, request: &GenericRequest) -> Result<Value> {
        self.post(
            "/upstox/market-data",
            &MarketDataBody {
                endpoint: &request.endpoint,
                params: &request.params,
            },
        )
        .await
    }

    pub async fn exchange_code(&self, code: &str) -> Result<ExchangeOutcome> {
        self.post("/upstox/oauth", &CodeBody { code }).await
    }

    pub async fn credential_status(&self) -> Result<CredentialStatus> {
        self.get("/upstox/status").await
    }
}
