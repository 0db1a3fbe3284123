//! Request-time classification of the stored credential.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::CredentialStoreTrait;
use crate::errors::{Error, Result, UnauthorizedReason};

/// Outcome of resolving the current credential.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialState {
    /// A credential exists and has not expired; carries the access token.
    Usable(String),
    /// No credential has ever been issued.
    Absent,
    /// The latest credential expired at the given instant.
    Expired { expired_at: DateTime<Utc> },
}

impl CredentialState {
    /// Bearer token for a usable credential, or the matching `Unauthorized` error.
    pub fn into_token(self) -> Result<String> {
        match self {
            CredentialState::Usable(token) => Ok(token),
            CredentialState::Absent => Err(Error::Unauthorized(UnauthorizedReason::Absent)),
            CredentialState::Expired { expired_at } => {
                Err(Error::Unauthorized(UnauthorizedReason::Expired { expired_at }))
            }
        }
    }
}

impl std::fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialState::Usable(_) => f.write_str("Usable(<redacted>)"),
            CredentialState::Absent => f.write_str("Absent"),
            CredentialState::Expired { expired_at } => {
                write!(f, "Expired {{ expired_at: {} }}", expired_at)
            }
        }
    }
}

/// Reads the latest credential and decides whether it can be attached to an
/// outbound call. Expiry is checked lazily; nothing refreshes in the background.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStoreTrait>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStoreTrait>) -> Self {
        Self { store }
    }

    pub fn resolve(&self) -> Result<CredentialState> {
        self.resolve_at(Utc::now())
    }

    pub fn resolve_at(&self, now: DateTime<Utc>) -> Result<CredentialState> {
        Ok(self.snapshot_at(now)?.0)
    }

    /// State and expiry taken from one read of the store, so a concurrent
    /// `put` cannot pair one credential's state with another's expiry.
    pub fn resolve_with_expiry(&self) -> Result<(CredentialState, Option<DateTime<Utc>>)> {
        self.snapshot_at(Utc::now())
    }

    fn snapshot_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(CredentialState, Option<DateTime<Utc>>)> {
        let snapshot = match self.store.get_latest()? {
            None => (CredentialState::Absent, None),
            Some(credential) if credential.is_expired_at(now) => (
                CredentialState::Expired {
                    expired_at: credential.expires_at,
                },
                Some(credential.expires_at),
            ),
            Some(credential) => {
                let expires_at = credential.expires_at;
                (CredentialState::Usable(credential.access_token), Some(expires_at))
            }
        };
        Ok(snapshot)
    }
}
