//! The seam between the gateway and the network.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::models::{TokenExchangeForm, TokenResponse};
use crate::errors::{Error, Result, ValidationError};

/// An authenticated GET against the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCall {
    /// Path relative to the provider base, starting with `/`. Segments are
    /// already percent-encoded.
    pub path: String,
    /// Query parameters, form-encoded when the URL is built.
    pub query: Vec<(String, String)>,
    pub bearer: String,
}

impl ProviderCall {
    pub fn new(path: impl Into<String>, bearer: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            bearer: bearer.into(),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Absolute URL for this call against `base_url`.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Unexpected(format!("Invalid provider URL '{}': {}", raw, e)))?;

        // Dot segments (literal or percent-encoded) are resolved by the parser;
        // the result must still sit under the base path.
        let base_path = Url::parse(base_url)
            .map(|b| b.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let path = url.path();
        if !(path == base_path || path.starts_with(&format!("{}/", base_path))) {
            return Err(ValidationError::InvalidInput(format!(
                "path '{}' escapes the provider base path",
                self.path
            ))
            .into());
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ProviderCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCall")
            .field("path", &self.path)
            .field("query", &self.query)
            .field("bearer", &"<redacted>")
            .finish()
    }
}

/// Outbound access to the Upstox REST API.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Perform `call` and return the provider's JSON body unchanged.
    ///
    /// Non-2xx responses and 2xx bodies that are not JSON map to
    /// `Error::Provider`; connection failures map to `Error::Network`.
    async fn get_json(&self, call: ProviderCall) -> Result<Value>;

    /// Trade an authorization code for a token.
    ///
    /// Non-2xx responses and unparseable success bodies map to
    /// `Error::ExchangeFailed`.
    async fn exchange_token(&self, form: TokenExchangeForm) -> Result<TokenResponse>;
}
