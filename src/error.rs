//! Error types for the warehouse mirror.
//!
//! The aggregation pipeline itself is infallible; failures only arise at
//! the storage boundary and are surfaced to the dashboard service, which
//! degrades to an error card rather than panicking.

use thiserror::Error;

/// Errors from opening or querying the warehouse mirror.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),
}
