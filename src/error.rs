// Error types for store operations

use thiserror::Error;

/// Errors surfaced by store operations.
///
/// Decode failures on the persisted blob are never surfaced here; loading
/// falls back to the default empty state instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was empty or an input failed to parse. The store
    /// is left unchanged.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation targeted an id that is not in the store.
    #[error("task not found: {id}")]
    NotFound { id: String },

    /// An imported blob contained no valid rows. The store is left
    /// untouched.
    #[error("import failed: {0}")]
    Import(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Stable machine-readable code, used by tests and CLI reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Import(_) => "import",
            Self::Io(_) => "io",
            Self::Serialize(_) => "serialize",
        }
    }
}
