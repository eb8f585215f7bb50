//! Index Codec
//!
//! Persists a [`RowIndex`] so restarts skip the full-file scan.
//!
//! ## File Format
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │ Magic bytes: "GHIX" (4 bytes)                  │
//! │ Version: 1 (u16, little-endian)                │
//! │ Total rows (u64)                               │
//! │ Granularity (u64)                              │
//! │ Source file length (u64)                       │
//! │ Source file mtime, ms since epoch (u64)        │
//! │ Entry count (u32)                              │
//! ├────────────────────────────────────────────────┤
//! │ Anchor offsets (u64 each)                      │
//! ├────────────────────────────────────────────────┤
//! │ CRC32 of all preceding bytes (u32)             │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The source length/mtime fields carry the
//! freshness fingerprint checked by [`RowIndex::is_fresh`].
//!
//! ## Failure Policy
//!
//! An absent file loads as `None` (first run). Anything else that is not a
//! well-formed current-version file — truncation, foreign magic (including
//! the old headerless layout), future version, CRC mismatch, inconsistent
//! entry count — is a loud error; the table-open path decides whether that
//! means "rebuild" or "die".

use std::io::ErrorKind;
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::index::RowIndex;

/// Magic bytes for index files: "GHIX".
pub const INDEX_MAGIC: [u8; 4] = *b"GHIX";

/// Current index format version.
pub const INDEX_VERSION: u16 = 1;

/// Fixed bytes before the offsets array.
const HEADER_SIZE: usize = 4 + 2 + 8 + 8 + 8 + 8 + 4;

/// CRC32 trailer.
const TRAILER_SIZE: usize = 4;

/// Serialize `index` to `path`, overwriting any previous file.
pub fn write(index: &RowIndex, path: &Path) -> Result<()> {
    let offsets = index.offsets();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + offsets.len() * 8 + TRAILER_SIZE);

    buf.put_slice(&INDEX_MAGIC);
    buf.put_u16_le(INDEX_VERSION);
    buf.put_u64_le(index.total_rows());
    buf.put_u64_le(index.granularity());
    buf.put_u64_le(index.source_len());
    buf.put_u64_le(index.source_mtime_ms());
    buf.put_u32_le(offsets.len() as u32);
    for &offset in offsets {
        buf.put_u64_le(offset);
    }
    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);

    std::fs::write(path, &buf)?;
    tracing::info!(
        path = ?path,
        total_rows = index.total_rows(),
        anchors = offsets.len(),
        "row index persisted"
    );
    Ok(())
}

/// Load an index from `path`. `Ok(None)` if the file does not exist;
/// loud errors for every malformed shape.
pub fn load(path: &Path) -> Result<Option<RowIndex>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    if data.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(Error::InvalidIndex(format!(
            "index file truncated at {} bytes",
            data.len()
        )));
    }
    if data[..4] != INDEX_MAGIC {
        return Err(Error::InvalidMagic);
    }

    let mut cursor = &data[4..];
    let version = cursor.get_u16_le();
    if version != INDEX_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let body_len = data.len() - TRAILER_SIZE;
    let stored_crc = (&data[body_len..]).get_u32_le();
    let computed_crc = crc32fast::hash(&data[..body_len]);
    if stored_crc != computed_crc {
        return Err(Error::CrcMismatch);
    }

    let total_rows = cursor.get_u64_le();
    let granularity = cursor.get_u64_le();
    let source_len = cursor.get_u64_le();
    let source_mtime_ms = cursor.get_u64_le();
    let entry_count = cursor.get_u32_le() as usize;

    if data.len() != HEADER_SIZE + entry_count * 8 + TRAILER_SIZE {
        return Err(Error::InvalidIndex(format!(
            "{} bytes for {} entries",
            data.len(),
            entry_count
        )));
    }

    let mut offsets = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        offsets.push(cursor.get_u64_le());
    }

    let index = RowIndex::new(total_rows, granularity, offsets, source_len, source_mtime_ms)?;
    tracing::debug!(
        path = ?path,
        total_rows = index.total_rows(),
        anchors = entry_count,
        "row index loaded"
    );
    Ok(Some(index))
}
