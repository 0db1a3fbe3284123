use crate::credentials::credentials_model::{Credential, NewCredential};
use crate::errors::Result;
use async_trait::async_trait;

/// Storage for the single current Upstox credential.
///
/// Implementations must make `put` atomic: a concurrent reader observes either
/// the previous credential or the new one, never an empty or doubled state.
#[async_trait]
pub trait CredentialStoreTrait: Send + Sync {
    /// Discard every stored credential and persist `credential` as the only one.
    async fn put(&self, credential: NewCredential) -> Result<Credential>;

    /// The current credential, or `None` if one has never been issued.
    fn get_latest(&self) -> Result<Option<Credential>>;
}
