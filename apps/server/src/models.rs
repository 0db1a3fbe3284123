use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dalal_core::auth::ExchangeOutcome;
use dalal_core::gateway::{
    CredentialStatus, CredentialStatusState, GenericRequest, HistoricalRequest, QuotesRequest,
};
use dalal_core::errors::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CodeBody {
    /// One-time authorization code from the provider redirect.
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub success: bool,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl From<ExchangeOutcome> for ExchangeResponse {
    fn from(o: ExchangeOutcome) -> Self {
        Self {
            success: o.success,
            message: o.message,
            expires_at: o.expires_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuotesBody {
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl From<QuotesBody> for QuotesRequest {
    fn from(b: QuotesBody) -> Self {
        QuotesRequest::new(b.symbols)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoricalBody {
    #[serde(default)]
    pub symbol: String,
    /// Candle interval; `day` when omitted.
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

impl From<HistoricalBody> for HistoricalRequest {
    fn from(b: HistoricalBody) -> Self {
        HistoricalRequest {
            symbol: b.symbol,
            interval: b.interval,
            from_date: b.from_date,
            to_date: b.to_date,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarketDataBody {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub params: Option<Map<String, Value>>,
}

impl TryFrom<MarketDataBody> for GenericRequest {
    type Error = ValidationError;

    fn try_from(b: MarketDataBody) -> Result<Self, Self::Error> {
        GenericRequest::from_json_params(b.endpoint, b.params)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// One of `usable`, `absent`, `expired` or `static_key`.
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub auth_mode: String,
}

impl From<CredentialStatus> for StatusResponse {
    fn from(s: CredentialStatus) -> Self {
        let state = match s.state {
            CredentialStatusState::Usable => "usable",
            CredentialStatusState::Absent => "absent",
            CredentialStatusState::Expired => "expired",
            CredentialStatusState::StaticKey => "static_key",
        };
        Self {
            state: state.to_string(),
            expires_at: s.expires_at,
            auth_mode: s.auth_mode,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InstrumentsResponse {
    /// Ticker to instrument key.
    pub instruments: BTreeMap<String, String>,
}
