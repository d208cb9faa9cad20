use thiserror::Error;

/// Result type alias for Blueprint core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the store and the board.
///
/// Validation failures are raised before any statement reaches storage;
/// storage failures are surfaced to the caller, which is expected to refetch
/// authoritative state rather than retry.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
