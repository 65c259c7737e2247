use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("no per-user data directory on this platform; pass a database path")]
    NoDataDir,

    /// A saved row was asked to hang off an entity that only exists in memory.
    #[error("{0} refers to an unsaved entity")]
    UnsavedReference(&'static str),

    #[error("no document transaction is open")]
    NoTransaction,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
