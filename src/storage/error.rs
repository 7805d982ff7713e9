//! Store error taxonomy.

/// Errors returned by [`TextStore`](crate::storage::TextStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed or empty request data
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// The code was never issued, has expired, or has been swept
    #[error("code not found")]
    NotFound,

    /// Every candidate code collided with a live record
    #[error("no free code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    /// Connection, pool or SQL failure
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// A live record already holds the code being inserted
    #[error("duplicate code")]
    DuplicateCode,
}

