//! SQLite storage implementation for the Upstox credential.

mod model;
mod repository;

pub use model::UpstoxTokenDB;
pub use repository::SqliteCredentialStore;

// Re-export trait from core for convenience
pub use dalal_core::credentials::CredentialStoreTrait;
