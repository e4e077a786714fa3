//! # Application Error Types

use std::path::PathBuf;
use thiserror::Error;

use examquest_gacha::{CollectionId, GachaError};

/// Errors raised by the application layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// A file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A catalog or document was not valid JSON of the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog has no collection with this id.
    #[error("unknown collection {0}")]
    UnknownCollection(CollectionId),

    /// The catalog is structurally wrong.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A bad command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Error from the gacha engine.
    #[error(transparent)]
    Gacha(#[from] GachaError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
