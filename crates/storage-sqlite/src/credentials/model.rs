//! Database model for the stored Upstox credential.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use crate::errors::StorageError;
use dalal_core::credentials::Credential;

/// One row of `upstox_tokens`. Timestamps are fixed-width RFC 3339 UTC
/// strings so ordering by `created_at` is chronological.
#[derive(Queryable, Insertable, Selectable, Clone)]
#[diesel(table_name = crate::schema::upstox_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UpstoxTokenDB {
    pub id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: String,
    pub created_at: String,
}

pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("upstox_tokens.{} '{}': {}", column, raw, e)))
}

impl From<&Credential> for UpstoxTokenDB {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id.clone(),
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: encode_timestamp(credential.expires_at),
            created_at: encode_timestamp(credential.created_at),
        }
    }
}

impl TryFrom<UpstoxTokenDB> for Credential {
    type Error = StorageError;

    fn try_from(row: UpstoxTokenDB) -> Result<Self, Self::Error> {
        Ok(Credential {
            expires_at: decode_timestamp("expires_at", &row.expires_at)?,
            created_at: decode_timestamp("created_at", &row.created_at)?,
            id: row.id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
        })
    }
}
