//! Row Slicer
//!
//! Random access into the data file: given `(start_row, row_count,
//! start_col, col_count)`, produce exactly that rectangle of decoded cells.
//!
//! ## Read Flow
//!
//! ```text
//! get_slice(start_row=1_200_000_000, row_count=30)
//!     ↓
//! index.anchor_for(start_row) → byte anchor + records to skip
//!     ↓
//! positional read of a bounded chunk at the anchor
//!     ↓
//! walk line terminators: discard `skip` records, collect `row_count`
//!     ↓
//! too few rows and not at EOF? grow the chunk and re-parse
//!     ↓
//! project the column range, decode cells as UTF-8 (lossy)
//! ```
//!
//! ## Sizing
//!
//! The first read is `max(read_buffer_size, 30 × records needed)` bytes; each
//! under-read retry grows it by `50 × missing records`. The 30/50 factors
//! encode an expected average record length — tuning parameters, not
//! contracts. Both reads are capped at the bytes remaining past the anchor,
//! so the loop always terminates: either the rows fill up or the chunk
//! reaches end of file.
//!
//! ## Thread Safety
//!
//! `get_slice` takes `&self` and uses positional reads on a shared read-only
//! file handle, so concurrent requests need no mutex. The slicer serves the
//! byte range described by its index; bytes appended to the file after
//! indexing do not exist as far as slicing is concerned.

use std::fs::File;
use std::os::unix::fs::FileExt;
use std::sync::Arc;

use gridhouse_core::letters::col_letters_for_range;

use crate::config::TableConfig;
use crate::error::Result;
use crate::index::{RowIndex, LINE_TERMINATOR};

/// Expected bytes per record for the initial read estimate.
const ROW_BYTES_ESTIMATE: u64 = 30;

/// Extra bytes fetched per missing record on an under-read retry.
const RETRY_ROW_BYTES_ESTIMATE: u64 = 50;

/// A rectangle of decoded cells.
///
/// `cells_by_row` may hold fewer rows than were asked for — that happens
/// only when the request ran past the end of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub start_row: u64,
    pub start_col: u32,
    pub col_letters: Vec<String>,
    pub cells_by_row: Vec<Vec<String>>,
}

impl Slice {
    pub fn row_count(&self) -> u32 {
        self.cells_by_row.len() as u32
    }

    pub fn col_count(&self) -> u32 {
        self.col_letters.len() as u32
    }
}

/// Random-access reader over one indexed data file.
pub struct Slicer {
    file: File,
    file_len: u64,
    index: Arc<RowIndex>,
    columns: u32,
    delimiter: u8,
    read_buffer_size: usize,
}

impl Slicer {
    /// Open the data file read-only and bind it to its index.
    pub fn open(config: &TableConfig, index: Arc<RowIndex>) -> Result<Self> {
        let file = File::open(&config.file_path)?;
        Ok(Self {
            file,
            file_len: index.source_len(),
            index,
            columns: config.columns,
            delimiter: config.delimiter,
            read_buffer_size: config.read_buffer_size,
        })
    }

    /// Fetch a rectangle of cells, clamping every bound into the table.
    ///
    /// Safe to call concurrently; each call does its own positional reads.
    pub fn get_slice(
        &self,
        start_row: u64,
        row_count: u32,
        start_col: u32,
        col_count: u32,
    ) -> Result<Slice> {
        let total_rows = self.index.total_rows();

        let start_col = start_col.min(self.columns.saturating_sub(1));
        let col_count = col_count.min(self.columns - start_col);
        let col_letters = col_letters_for_range(start_col, col_count);

        if total_rows == 0 {
            return Ok(Slice {
                start_row: 0,
                start_col,
                col_letters,
                cells_by_row: Vec::new(),
            });
        }

        let start_row = start_row.min(total_rows - 1);
        let row_count = (row_count as u64).min(total_rows - start_row) as u32;
        if row_count == 0 {
            return Ok(Slice {
                start_row,
                start_col,
                col_letters,
                cells_by_row: Vec::new(),
            });
        }

        let anchor = self.index.anchor_for(start_row);
        let wanted_records = anchor.skip + row_count as u64;
        let available = self.file_len - anchor.offset;
        let mut read_len = (self.read_buffer_size as u64)
            .max(ROW_BYTES_ESTIMATE * wanted_records)
            .min(available);

        loop {
            let mut buf = vec![0u8; read_len as usize];
            self.file.read_exact_at(&mut buf, anchor.offset)?;
            let at_eof = anchor.offset + read_len == self.file_len;

            let records = parse_records(&buf, anchor.skip, row_count as usize, at_eof);
            if records.len() == row_count as usize || read_len == available {
                let cells_by_row = records
                    .iter()
                    .map(|record| self.project(record, start_col, col_count))
                    .collect();
                return Ok(Slice {
                    start_row,
                    start_col,
                    col_letters,
                    cells_by_row,
                });
            }

            let missing = row_count as u64 - records.len() as u64;
            let grown = (read_len + RETRY_ROW_BYTES_ESTIMATE * missing).min(available);
            tracing::debug!(
                start_row,
                got = records.len(),
                wanted = row_count,
                read_len,
                grown,
                "slice under-read, growing chunk"
            );
            read_len = grown;
        }
    }

    /// Split a record on the field separator and pick the requested columns,
    /// padding with empty strings past the last field. Invalid UTF-8 decodes
    /// to U+FFFD rather than failing the request.
    fn project(&self, record: &[u8], start_col: u32, col_count: u32) -> Vec<String> {
        let fields: Vec<&[u8]> = record
            .splitn(self.columns as usize, |&b| b == self.delimiter)
            .collect();
        (start_col..start_col + col_count)
            .map(|col| match fields.get(col as usize) {
                Some(field) => String::from_utf8_lossy(field).into_owned(),
                None => String::new(),
            })
            .collect()
    }
}

/// Walk line terminators in `buf`: discard `skip` records, then collect up
/// to `max` record byte spans. A trailing span without a terminator counts
/// only when the buffer reaches end of file; otherwise it is a partial
/// record and the caller must read more.
fn parse_records(buf: &[u8], skip: u64, max: usize, at_eof: bool) -> Vec<&[u8]> {
    let mut records = Vec::with_capacity(max.min(1024));
    let mut skipped = 0u64;
    let mut pos = 0usize;

    while records.len() < max {
        match buf[pos..].iter().position(|&b| b == LINE_TERMINATOR) {
            Some(rel) => {
                let end = pos + rel;
                if skipped < skip {
                    skipped += 1;
                } else {
                    records.push(&buf[pos..end]);
                }
                pos = end + 1;
            }
            None => {
                if at_eof && pos < buf.len() {
                    if skipped < skip {
                        skipped += 1;
                    } else {
                        records.push(&buf[pos..]);
                    }
                }
                break;
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // parse_records
    // ---------------------------------------------------------------

    #[test]
    fn test_parse_collects_terminated_records() {
        let records = parse_records(b"a;1\nbb;2\nccc;3\n", 0, 10, true);
        assert_eq!(records, vec![&b"a;1"[..], b"bb;2", b"ccc;3"]);
    }

    #[test]
    fn test_parse_skips_leading_records() {
        let records = parse_records(b"a;1\nbb;2\nccc;3\n", 2, 10, true);
        assert_eq!(records, vec![&b"ccc;3"[..]]);
    }

    #[test]
    fn test_parse_stops_at_max() {
        let records = parse_records(b"a;1\nbb;2\nccc;3\n", 0, 2, false);
        assert_eq!(records, vec![&b"a;1"[..], b"bb;2"]);
    }

    #[test]
    fn test_parse_ignores_partial_tail_before_eof() {
        // "ccc" may continue past this chunk; only EOF makes it a record.
        let records = parse_records(b"a;1\nbb;2\nccc", 0, 10, false);
        assert_eq!(records, vec![&b"a;1"[..], b"bb;2"]);
    }

    #[test]
    fn test_parse_takes_unterminated_tail_at_eof() {
        let records = parse_records(b"a;1\nbb;2\nccc", 0, 10, true);
        assert_eq!(records, vec![&b"a;1"[..], b"bb;2", b"ccc"]);
    }

    #[test]
    fn test_parse_empty_line_is_a_record() {
        let records = parse_records(b"a;1\n\nb;2\n", 0, 10, true);
        assert_eq!(records, vec![&b"a;1"[..], b"", b"b;2"]);
    }

    #[test]
    fn test_parse_skip_counts_empty_lines() {
        let records = parse_records(b"a;1\n\nb;2\n", 1, 10, true);
        assert_eq!(records, vec![&b""[..], b"b;2"]);
    }

    #[test]
    fn test_parse_empty_buffer() {
        assert!(parse_records(b"", 0, 10, true).is_empty());
        assert!(parse_records(b"", 0, 10, false).is_empty());
    }

    #[test]
    fn test_parse_skip_exceeding_records_yields_nothing() {
        assert!(parse_records(b"a;1\nbb;2\n", 5, 10, true).is_empty());
    }
}
