//! Error types for gdb_sync

use thiserror::Error;

/// Result type for gdb_sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for gdb_sync
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid relation name: {0}")]
    InvalidRelation(String),

    #[error("Staging schema error: {0}")]
    StagingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// True when the store reported that the relation (or its schema) is missing
    pub fn is_missing_relation(&self) -> bool {
        match self {
            Error::SqlxError(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("42P01") | Some("3F000"))
            }
            _ => false,
        }
    }
}

/// Convert Serde JSON errors to gdb_sync errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to gdb_sync errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
