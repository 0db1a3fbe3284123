//! Dalal Core - Upstox credential lifecycle and market-data gateway.
//!
//! This crate holds the domain logic: the credential model and store trait,
//! the authorization-code exchange, request-time credential resolution, the
//! authenticated proxy and the client-side pollers. It is database-agnostic;
//! the SQLite credential store lives in the `storage-sqlite` crate.

pub mod auth;
pub mod credentials;
pub mod errors;
pub mod gateway;
pub mod poller;
pub mod upstox;

pub use auth::{AuthorizationExchanger, ExchangeOutcome};
pub use credentials::{
    Credential, CredentialResolver, CredentialState, CredentialStoreTrait,
    InMemoryCredentialStore, NewCredential,
};
pub use gateway::{GatewayClient, ProxyGateway, ProxyRequest};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
