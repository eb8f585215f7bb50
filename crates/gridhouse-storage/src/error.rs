//! Storage Error Types
//!
//! Failure classes for the index and slicer:
//!
//! - I/O errors from the data file or the index file
//! - Index-file integrity failures (magic, version, CRC, truncation)
//! - Invalid build parameters
//!
//! All storage operations return `Result<T>`, aliased to `Result<T, Error>`,
//! so failures propagate with `?`. Whether an integrity failure is fatal is
//! the caller's policy: [`crate::table::Table::open`] treats a bad cached
//! index as a rebuild trigger, not a crash.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid magic bytes in index file")]
    InvalidMagic,

    #[error("Unsupported index version: {0}")]
    UnsupportedVersion(u16),

    #[error("Index CRC mismatch")]
    CrcMismatch,

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("Index granularity must be at least 1, got {0}")]
    InvalidGranularity(u64),
}
