use std::path::PathBuf;

use thiserror::Error;

use sayit_core::ParseError;
use sayit_store::StoreError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
