//! Authenticated forwarding of browser requests to Upstox.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::requests::{ProviderRequest, ProxyRequest};
use crate::credentials::{CredentialResolver, CredentialState};
use crate::errors::{Error, Result};
use crate::upstox::{AuthMode, ProviderCall, ProviderConfig, ProviderTransport};

/// Credential state as shown to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatusState {
    Usable,
    Absent,
    Expired,
    /// A deployment key is used; there is nothing to expire.
    StaticKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub state: CredentialStatusState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub auth_mode: String,
}

/// Stateless per call: one credential read and at most one provider call.
#[derive(Clone)]
pub struct ProxyGateway {
    resolver: CredentialResolver,
    config: Arc<ProviderConfig>,
    transport: Arc<dyn ProviderTransport>,
}

impl ProxyGateway {
    pub fn new(
        resolver: CredentialResolver,
        config: Arc<ProviderConfig>,
        transport: Arc<dyn ProviderTransport>,
    ) -> Self {
        Self {
            resolver,
            config,
            transport,
        }
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.config.auth_mode
    }

    fn bearer_token(&self) -> Result<String> {
        match self.config.auth_mode {
            AuthMode::OAuth => self.resolver.resolve()?.into_token(),
            AuthMode::ApiKey => self.config.api_key.clone().ok_or_else(|| {
                Error::Configuration("UPSTOX_API_KEY not configured".to_string())
            }),
        }
    }

    pub async fn forward(&self, request: impl Into<ProxyRequest>) -> Result<Value> {
        let request = request.into();
        request.validate()?;

        let bearer = self.bearer_token().inspect_err(|e| {
            if let Error::Unauthorized(reason) = e {
                warn!("[Upstox] Rejecting {} request: {}", request.label(), reason);
            }
        })?;

        let endpoint = request.endpoint();
        debug!("[Upstox] Forwarding {} request to {}", request.label(), endpoint.path);
        let call = ProviderCall::new(endpoint.path, bearer).with_query(endpoint.query);
        self.transport.get_json(call).await
    }

    /// Whether proxied calls can currently be authenticated. Never exposes the token.
    pub fn credential_status(&self) -> Result<CredentialStatus> {
        let auth_mode = self.config.auth_mode.as_str().to_string();
        if self.config.auth_mode == AuthMode::ApiKey {
            return Ok(CredentialStatus {
                state: CredentialStatusState::StaticKey,
                expires_at: None,
                auth_mode,
            });
        }

        let (state, expires_at) = self.resolver.resolve_with_expiry()?;
        let state = match state {
            CredentialState::Absent => CredentialStatusState::Absent,
            CredentialState::Expired { .. } => CredentialStatusState::Expired,
            CredentialState::Usable(_) => CredentialStatusState::Usable,
        };
        let status = CredentialStatus {
            state,
            expires_at,
            auth_mode,
        };
        Ok(status)
    }
}
