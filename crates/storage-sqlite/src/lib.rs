//! SQLite storage implementation for Dalal.
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. It implements the credential store trait defined in `dalal-core`
//! and contains:
//! - Database connection pooling and the single writer actor
//! - Embedded Diesel migrations
//! - The `upstox_tokens` model and repository
//!
//! ```text
//! core (domain) ──► storage-sqlite (this crate) ──► SQLite DB
//! ```

pub mod credentials;
pub mod db;
pub mod errors;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use credentials::SqliteCredentialStore;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from dalal-core for convenience
pub use dalal_core::errors::{DatabaseError, Error, Result};
