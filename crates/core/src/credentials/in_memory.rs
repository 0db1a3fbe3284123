//! Process-local credential store.
//!
//! Used when the server runs without a database file and by tests. The whole
//! record is swapped under one write guard, so readers never see a torn state.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;

use super::{Credential, CredentialStoreTrait, NewCredential};
use crate::errors::{Error, Result};

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStoreTrait for InMemoryCredentialStore {
    async fn put(&self, credential: NewCredential) -> Result<Credential> {
        let stored = credential.into_credential(Utc::now());
        let mut guard = self
            .current
            .write()
            .map_err(|_| Error::Unexpected("Credential store lock poisoned".into()))?;
        let replaced = guard.replace(stored.clone());
        debug!(
            "Stored new Upstox credential {} (replaced previous: {})",
            stored.id,
            replaced.is_some()
        );
        Ok(stored)
    }

    fn get_latest(&self) -> Result<Option<Credential>> {
        let guard = self
            .current
            .read()
            .map_err(|_| Error::Unexpected("Credential store lock poisoned".into()))?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_credential(token: &str) -> NewCredential {
        NewCredential {
            access_token: token.to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn empty_store_returns_none() {
        let store = InMemoryCredentialStore::new();
        assert!(store.get_latest().unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_is_always_the_last_put() {
        let store = InMemoryCredentialStore::new();
        for n in 1..=5 {
            let put = store.put(new_credential(&format!("token-{n}"))).await.unwrap();
            let latest = store.get_latest().unwrap().unwrap();
            assert_eq!(latest, put);
            assert_eq!(latest.access_token, format!("token-{n}"));
        }
    }

    #[tokio::test]
    async fn concurrent_readers_see_a_whole_credential() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.put(new_credential("seed")).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for n in 0..200 {
                    store.put(new_credential(&format!("w-{n}"))).await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..200 {
                    let latest = store.get_latest().unwrap();
                    let credential = latest.expect("a credential was seeded before readers ran");
                    assert!(credential.access_token == "seed" || credential.access_token.starts_with("w-"));
                    tokio::task::yield_now().await;
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(store.get_latest().unwrap().unwrap().access_token, "w-199");
    }
}
