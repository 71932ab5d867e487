//! Error taxonomy for the store and its persistence layer.
//!
//! Lenient cases never show up here: a malformed date/time input maps to the
//! "no deadline" sentinel, executing on an empty store is `Ok(None)`, and
//! deleting an unknown name is `Ok(())`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The task file exists but could not be decoded into task records.
    /// Restore fails hard on this; the caller decides whether to abort or
    /// start over with a fresh file.
    #[error("task file {} is corrupt: {reason}", path.display())]
    CorruptState { path: PathBuf, reason: String },

    #[error("reading task file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writing task file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
