use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::UpstoxTokenDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::upstox_tokens;
use dalal_core::credentials::{Credential, CredentialStoreTrait, NewCredential};
use dalal_core::errors::Result;

/// `upstox_tokens`-backed credential store.
///
/// Writes go through the single writer actor, so the delete-all and insert of
/// `put` share one `IMMEDIATE` transaction and readers never observe an empty
/// or doubled table.
pub struct SqliteCredentialStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteCredentialStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteCredentialStore { pool, writer }
    }
}

#[async_trait]
impl CredentialStoreTrait for SqliteCredentialStore {
    async fn put(&self, credential: NewCredential) -> Result<Credential> {
        let credential = credential.into_credential(Utc::now());
        let row = UpstoxTokenDB::from(&credential);

        let removed = self
            .writer
            .exec(move |conn| {
                let removed = diesel::delete(upstox_tokens::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::insert_into(upstox_tokens::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(removed)
            })
            .await?;

        debug!(
            "Stored Upstox credential {} (removed {} previous)",
            credential.id, removed
        );
        Ok(credential)
    }

    fn get_latest(&self) -> Result<Option<Credential>> {
        let mut conn = get_connection(&self.pool)?;
        let row = upstox_tokens::table
            .select(UpstoxTokenDB::as_select())
            .order(upstox_tokens::created_at.desc())
            .first::<UpstoxTokenDB>(&mut conn)
            .optional()
            .into_core()?;

        match row {
            Some(row) => Ok(Some(Credential::try_from(row)?)),
            None => Ok(None),
        }
    }
}
