//! Upstox provider integration: configuration, wire models, transport.

pub mod client;
pub mod config;
pub mod instruments;
pub mod models;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use client::UpstoxClient;
pub use config::{
    AuthMode, OAuthClient, ProviderConfig, ProviderSettings, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT_SECS,
};
pub use instruments::{instrument_key, instrument_keys, instrument_table};
pub use models::{TokenExchangeForm, TokenResponse, DEFAULT_TOKEN_LIFETIME_SECS};
pub use transport::{ProviderCall, ProviderTransport};
