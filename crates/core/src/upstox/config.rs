//! Provider configuration and authentication-mode selection.

use std::str::FromStr;
use std::time::Duration;

use log::warn;
use serde::Serialize;

use crate::errors::{Error, Result};

/// Default base URL for the Upstox v2 REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.upstox.com/v2";

/// Default timeout for outbound provider calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How outbound calls obtain their bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Token issued through the authorization-code exchange and read from the store.
    #[serde(rename = "oauth")]
    OAuth,
    /// Long-lived key taken from the deployment configuration.
    ApiKey,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::OAuth => "oauth",
            AuthMode::ApiKey => "api_key",
        }
    }
}

impl FromStr for AuthMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oauth" => Ok(AuthMode::OAuth),
            "api_key" | "apikey" => Ok(AuthMode::ApiKey),
            other => Err(Error::Configuration(format!(
                "Unknown UPSTOX_AUTH_MODE '{}'; expected 'oauth' or 'api_key'",
                other
            ))),
        }
    }
}

/// Raw provider settings as read from the environment. Blank values count as unset.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_key: Option<String>,
    pub auth_mode: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// OAuth client registration borrowed from [`ProviderConfig`].
#[derive(Clone, Copy)]
pub struct OAuthClient<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_key: Option<String>,
    pub auth_mode: AuthMode,
    pub timeout: Duration,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderConfig {
    /// Build the configuration and settle the authentication mode.
    ///
    /// An explicit mode wins. Otherwise OAuth is chosen whenever any OAuth
    /// setting is present, the static key only when no OAuth setting is, and
    /// OAuth when nothing is configured at all.
    pub fn from_settings(settings: ProviderSettings) -> Result<Self> {
        let client_id = non_blank(settings.client_id);
        let client_secret = non_blank(settings.client_secret);
        let redirect_uri = non_blank(settings.redirect_uri);
        let api_key = non_blank(settings.api_key);

        let any_oauth = client_id.is_some() || client_secret.is_some() || redirect_uri.is_some();

        let auth_mode = match non_blank(settings.auth_mode) {
            Some(explicit) => {
                let mode = explicit.parse::<AuthMode>()?;
                if mode == AuthMode::ApiKey && api_key.is_none() {
                    return Err(Error::Configuration(
                        "UPSTOX_AUTH_MODE is 'api_key' but UPSTOX_API_KEY is not set".to_string(),
                    ));
                }
                mode
            }
            None if any_oauth => {
                if api_key.is_some() {
                    warn!(
                        "[Upstox] Both OAuth settings and UPSTOX_API_KEY are configured; using OAuth. Set UPSTOX_AUTH_MODE to choose explicitly."
                    );
                }
                AuthMode::OAuth
            }
            None if api_key.is_some() => AuthMode::ApiKey,
            None => AuthMode::OAuth,
        };

        let base_url = non_blank(settings.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            client_id,
            client_secret,
            redirect_uri,
            api_key,
            auth_mode,
            timeout: Duration::from_secs(settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// The full OAuth registration, or a `Configuration` error naming what is missing.
    pub fn oauth_client(&self) -> Result<OAuthClient<'_>> {
        match (&self.client_id, &self.client_secret, &self.redirect_uri) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(OAuthClient {
                client_id,
                client_secret,
                redirect_uri,
            }),
            _ => {
                let mut missing = Vec::new();
                if self.client_id.is_none() {
                    missing.push("UPSTOX_CLIENT_ID");
                }
                if self.client_secret.is_none() {
                    missing.push("UPSTOX_CLIENT_SECRET");
                }
                if self.redirect_uri.is_none() {
                    missing.push("UPSTOX_REDIRECT_URI");
                }
                Err(Error::Configuration(format!(
                    "Upstox OAuth is not configured: missing {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            api_key: None,
            auth_mode: AuthMode::OAuth,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auth_mode", &self.auth_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}
