use std::path::PathBuf;

use thiserror::Error;

/// Library-level error type.
/// Binaries wrap it in `anyhow::Error`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A persisted store exists but cannot be read or parsed.
    #[error("Storage unavailable at {}: {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    /// The completion service returned nothing usable.
    #[error("Completion service failure: {0}")]
    ServiceFailure(String),

    #[error("Document '{document}' has no '{field}' field")]
    MissingField { document: String, field: String },

    #[error("Invalid front matter in '{document}': {reason}")]
    FrontMatter { document: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn storage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
