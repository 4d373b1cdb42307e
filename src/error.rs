//! CMS-specific error types

use thiserror::Error;

/// Errors raised by the sync core and the batch commands
#[derive(Error, Debug)]
pub enum CmsError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Document store (git) error
    #[error("Document store error: {0}")]
    Store(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row carries a uuid that no longer resolves to a document
    #[error("No document found for uuid {0}")]
    DocumentMissing(String),

    /// Asset transfer failure (download or upload)
    #[error("Asset transfer failed: {0}")]
    Asset(String),

    /// Per-entity validation failure; batch commands skip these
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another batch command holds the advisory lock
    #[error("Another '{0}' run is already in progress")]
    Locked(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CmsError>;
