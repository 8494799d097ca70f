// Store layer - isolates all database side effects
pub mod accounts;
pub mod publications;

use thiserror::Error;

pub use accounts::{AccountStore, DynAccountStore, SqliteAccountStore};
pub use publications::{DynPublicationStore, PublicationStore, SqlitePublicationStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("email already registered")]
    DuplicateEmail,
}
