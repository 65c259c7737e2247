//! Where imported speeches end up.
//!
//! The import driver talks to a [`Sink`]; [`SqliteSink`] persists to a local
//! database and [`MemorySink`] keeps everything in memory.

pub mod error;
pub mod memory;
pub mod sink;
pub mod sqlite;

use std::path::PathBuf;

pub use error::{Result, StoreError};
pub use memory::MemorySink;
pub use sink::{ImportEntry, NewEntity, NewSpeech, Sink};
pub use sqlite::{ImportRow, SqliteSink};

/// `<data dir>/sayit/sayit.db`.
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("sayit").join("sayit.db"))
        .ok_or(StoreError::NoDataDir)
}
