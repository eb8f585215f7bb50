//! Index Builder
//!
//! Single sequential pass over the data file: count line terminators and
//! record the byte offset immediately after every G-th one. Memory stays
//! bounded by one scan chunk plus the growing offsets vector
//! (`total_rows / G` entries).
//!
//! The scan is chunked but the result must not depend on where chunks fall —
//! a line terminator as the last byte of a chunk is the classic trap, so the
//! running global offset is only advanced after each chunk is fully scanned.
//!
//! Two deliberate counting rules (see DESIGN.md):
//! - a non-empty file whose last byte is not a terminator contributes one
//!   final, unterminated record
//! - empty lines count as records, matching what the slicer yields

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::index::{mtime_millis, RowIndex, LINE_TERMINATOR};

/// Scan `path` and build a [`RowIndex`] with an anchor every `granularity`
/// records, reading `chunk_size` bytes at a time.
///
/// I/O errors are fatal; a short read is treated as end-of-file and the
/// result reflects exactly the bytes consumed.
pub fn build(path: &Path, granularity: u64, chunk_size: usize) -> Result<RowIndex> {
    if granularity == 0 {
        return Err(Error::InvalidGranularity(granularity));
    }
    let mut file = File::open(path)?;
    let mtime_ms = mtime_millis(&file.metadata()?);

    let mut offsets: Vec<u64> = vec![0];
    let mut total_rows: u64 = 0;
    let mut since_last: u64 = 0;
    let mut global_offset: u64 = 0;
    let mut last_byte: u8 = LINE_TERMINATOR;

    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        for (i, &byte) in chunk[..n].iter().enumerate() {
            if byte == LINE_TERMINATOR {
                total_rows += 1;
                since_last += 1;
                if since_last == granularity {
                    offsets.push(global_offset + i as u64 + 1);
                    since_last = 0;
                }
            }
        }
        last_byte = chunk[n - 1];
        global_offset += n as u64;
    }

    // A final record without a trailing terminator still counts.
    if global_offset > 0 && last_byte != LINE_TERMINATOR {
        total_rows += 1;
    }

    // An anchor at EOF would start a record that does not exist.
    if offsets.last() == Some(&global_offset) {
        offsets.pop();
    }

    let index = RowIndex::new(total_rows, granularity, offsets, global_offset, mtime_ms)?;
    tracing::info!(
        path = ?path,
        total_rows = index.total_rows(),
        anchors = index.offsets().len(),
        bytes = index.source_len(),
        "row index built"
    );
    Ok(index)
}
