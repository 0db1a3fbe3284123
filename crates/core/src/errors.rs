//! Core error types for the Dalal gateway.
//!
//! Every failure that can cross the gateway boundary is one of the variants
//! below. Storage-specific errors (Diesel, SQLite) are converted into
//! [`DatabaseError`] by the storage crate so this type stays database-agnostic.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// A required secret or URI is missing from the deployment.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No usable credential is on file.
    #[error("{0}")]
    Unauthorized(UnauthorizedReason),

    /// The provider rejected the authorization-code exchange.
    #[error("Failed to exchange authorization code (HTTP {status}): {body}")]
    ExchangeFailed { status: u16, body: String },

    /// The provider rejected a forwarded request.
    #[error("Upstox API error: {status} - {body}")]
    Provider { status: u16, body: String },

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The provider could not be reached (timeout, DNS, TLS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Stable machine-readable tag for the variant, used in the wire payload.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::Unauthorized(UnauthorizedReason::Absent) => "unauthorized_absent",
            Error::Unauthorized(UnauthorizedReason::Expired { .. }) => "unauthorized_expired",
            Error::ExchangeFailed { .. } => "exchange_failed",
            Error::Provider { .. } => "provider_error",
            Error::Validation(_) => "validation_error",
            Error::Network(_) => "network_error",
            Error::Database(_) => "database_error",
            Error::Unexpected(_) => "internal_error",
        }
    }
}

/// Why a proxied request could not be authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// The authorization flow has never completed.
    Absent,
    /// A credential exists but its expiry has passed.
    Expired { expired_at: DateTime<Utc> },
}

impl std::fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnauthorizedReason::Absent => write!(
                f,
                "Not authenticated with Upstox. Complete the authorization flow first."
            ),
            UnauthorizedReason::Expired { expired_at } => write!(
                f,
                "Upstox session expired at {}. Please re-authorize.",
                expired_at.to_rfc3339()
            ),
        }
    }
}

/// Errors raised while validating an inbound request, before any network call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Database-agnostic error type for storage operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network(format!("Request to Upstox timed out: {}", err))
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unauthorized_messages_distinguish_absent_from_expired() {
        let absent = Error::Unauthorized(UnauthorizedReason::Absent);
        let expired = Error::Unauthorized(UnauthorizedReason::Expired {
            expired_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap(),
        });

        assert_ne!(absent.to_string(), expired.to_string());
        assert!(absent.to_string().contains("Not authenticated"));
        assert!(expired.to_string().contains("2024-03-01T09:15:00"));
        assert_eq!(absent.kind(), "unauthorized_absent");
        assert_eq!(expired.kind(), "unauthorized_expired");
    }

    #[test]
    fn provider_error_keeps_status_and_body() {
        let err = Error::Provider {
            status: 429,
            body: "{\"status\":\"error\"}".to_string(),
        };
        assert_eq!(err.to_string(), "Upstox API error: 429 - {\"status\":\"error\"}");
        assert_eq!(err.kind(), "provider_error");
    }

    #[test]
    fn validation_error_wraps_into_root() {
        let err: Error = ValidationError::MissingField("symbol").into();
        assert_eq!(err.to_string(), "Input validation failed: symbol is required");
        assert_eq!(err.kind(), "validation_error");
    }
}
