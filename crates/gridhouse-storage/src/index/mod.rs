//! Sparse Row Index
//!
//! The index is what turns "give me rows 1 200 000 000..1 200 000 030" into a
//! single bounded disk read instead of a scan from the start of a
//! multi-gigabyte file.
//!
//! ## Structure
//!
//! One byte offset per `granularity` rows:
//!
//! ```text
//! offsets[0] = 0          → first byte of row 0
//! offsets[1]              → first byte of row G
//! offsets[2]              → first byte of row 2·G
//! ...
//! ```
//!
//! For a 14 GB file with one billion 14-byte rows and G = 1000, that is one
//! million `u64`s — 8 MB of memory for O(1) access to any row.
//!
//! ## Lookup
//!
//! `anchor_for(row)` returns the nearest anchor at or before `row` plus the
//! number of records to skip from there. The caller seeks to the anchor,
//! discards `skip` line terminators, and is positioned exactly at `row`.
//!
//! ## Invariants
//!
//! - `offsets[0] == 0` whenever the index is non-empty
//! - offsets are strictly increasing and below the file size
//! - every offset is 0 or points one byte past a line terminator
//! - an anchor that would equal the file size is omitted
//!
//! ## Lifecycle
//!
//! Built once per `(file, granularity)` pair by [`builder`], persisted by
//! [`codec`], and published behind `Arc` — nothing mutates it afterwards, so
//! concurrent readers share it without locking.

pub mod builder;
pub mod codec;

use crate::error::{Error, Result};

/// The record terminator byte (`\n`).
pub const LINE_TERMINATOR: u8 = 0x0A;

/// A byte anchor for a requested row: start reading at `offset`, discard
/// `skip` records, and the next record is the requested row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub offset: u64,
    pub skip: u64,
}

/// Immutable sparse index over one data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIndex {
    total_rows: u64,
    granularity: u64,
    offsets: Vec<u64>,
    source_len: u64,
    source_mtime_ms: u64,
}

impl RowIndex {
    /// Assemble an index, checking the structural invariants.
    pub fn new(
        total_rows: u64,
        granularity: u64,
        offsets: Vec<u64>,
        source_len: u64,
        source_mtime_ms: u64,
    ) -> Result<Self> {
        if granularity == 0 {
            return Err(Error::InvalidGranularity(granularity));
        }
        if total_rows > 0 && offsets.first() != Some(&0) {
            return Err(Error::InvalidIndex(
                "first anchor must be offset 0".to_string(),
            ));
        }
        let expected = expected_anchor_count(total_rows, granularity);
        if offsets.len() as u64 > expected {
            return Err(Error::InvalidIndex(format!(
                "{} anchors for {} rows at granularity {}",
                offsets.len(),
                total_rows,
                granularity
            )));
        }
        for pair in offsets.windows(2) {
            if pair[0] >= pair[1] {
                return Err(Error::InvalidIndex(format!(
                    "anchors not strictly increasing at {} >= {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(&last) = offsets.last() {
            if last >= source_len && !(last == 0 && source_len == 0) {
                return Err(Error::InvalidIndex(format!(
                    "anchor {last} beyond file of {source_len} bytes"
                )));
            }
        }
        Ok(Self {
            total_rows,
            granularity,
            offsets,
            source_len,
            source_mtime_ms,
        })
    }

    /// Number of records in the file.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    /// Records between successive anchors.
    pub fn granularity(&self) -> u64 {
        self.granularity
    }

    /// The anchor offsets themselves.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Size of the data file when the index was built.
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// Modification time (ms since epoch) of the data file at build time.
    pub fn source_mtime_ms(&self) -> u64 {
        self.source_mtime_ms
    }

    /// Nearest anchor at or before `row`. Callers clamp `row` below
    /// [`Self::total_rows`] first.
    pub fn anchor_for(&self, row: u64) -> Anchor {
        let k = (row / self.granularity) as usize;
        debug_assert!(k < self.offsets.len() || self.offsets.is_empty());
        match self.offsets.get(k) {
            Some(&offset) => Anchor {
                offset,
                skip: row % self.granularity,
            },
            // Unreachable for clamped rows; fall back to a scan from 0.
            None => Anchor {
                offset: 0,
                skip: row,
            },
        }
    }

    /// Whether a cached index still describes the file at `source_len` /
    /// `source_mtime_ms`: the stored fingerprint must match exactly, and the
    /// row count must sit inside the plausibility band for 5–50 byte records.
    pub fn is_fresh(&self, source_len: u64, source_mtime_ms: u64) -> bool {
        self.source_len == source_len
            && self.source_mtime_ms == source_mtime_ms
            && self.row_count_plausible(source_len)
    }

    fn row_count_plausible(&self, source_len: u64) -> bool {
        let min_rows = source_len / 50;
        let max_rows = source_len.div_ceil(5);
        (min_rows..=max_rows).contains(&self.total_rows)
    }
}

/// `⌈total_rows / granularity⌉` — the anchor count before the
/// trailing-anchor-at-EOF omission.
fn expected_anchor_count(total_rows: u64, granularity: u64) -> u64 {
    total_rows.div_ceil(granularity)
}

/// Millisecond mtime from file metadata, for the index freshness fingerprint.
pub(crate) fn mtime_millis(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> RowIndex {
        // 5 rows, G = 2, anchors before rows 0, 2, 4.
        RowIndex::new(5, 2, vec![0, 26, 57], 69, 1_700_000_000_000).unwrap()
    }

    // ---------------------------------------------------------------
    // Construction and validation
    // ---------------------------------------------------------------

    #[test]
    fn test_accessors() {
        let index = sample_index();
        assert_eq!(index.total_rows(), 5);
        assert_eq!(index.granularity(), 2);
        assert_eq!(index.offsets(), &[0, 26, 57]);
        assert_eq!(index.source_len(), 69);
    }

    #[test]
    fn test_rejects_zero_granularity() {
        let result = RowIndex::new(5, 0, vec![0], 69, 0);
        assert!(matches!(result, Err(Error::InvalidGranularity(0))));
    }

    #[test]
    fn test_rejects_nonzero_first_anchor() {
        let result = RowIndex::new(5, 2, vec![13, 26], 69, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unsorted_anchors() {
        let result = RowIndex::new(5, 2, vec![0, 26, 26], 69, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_anchor_beyond_file() {
        let result = RowIndex::new(5, 2, vec![0, 26, 69], 69, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_too_many_anchors() {
        let result = RowIndex::new(5, 2, vec![0, 13, 26, 41], 69, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_index_is_valid() {
        let index = RowIndex::new(0, 1000, vec![], 0, 0).unwrap();
        assert_eq!(index.total_rows(), 0);
        assert!(index.offsets().is_empty());
    }

    // ---------------------------------------------------------------
    // Anchor lookup
    // ---------------------------------------------------------------

    #[test]
    fn test_anchor_for_anchor_rows() {
        let index = sample_index();
        assert_eq!(index.anchor_for(0), Anchor { offset: 0, skip: 0 });
        assert_eq!(index.anchor_for(2), Anchor { offset: 26, skip: 0 });
        assert_eq!(index.anchor_for(4), Anchor { offset: 57, skip: 0 });
    }

    #[test]
    fn test_anchor_for_rows_between_anchors() {
        let index = sample_index();
        assert_eq!(index.anchor_for(1), Anchor { offset: 0, skip: 1 });
        assert_eq!(index.anchor_for(3), Anchor { offset: 26, skip: 1 });
    }

    #[test]
    fn test_anchor_skip_never_reaches_granularity() {
        let index = RowIndex::new(100, 7, (0..15).map(|k| k * 70).collect(), 7000, 0).unwrap();
        for row in 0..100 {
            let anchor = index.anchor_for(row);
            assert!(anchor.skip < 7);
            assert_eq!(anchor.offset, (row / 7) * 70);
        }
    }

    // ---------------------------------------------------------------
    // Freshness
    // ---------------------------------------------------------------

    #[test]
    fn test_fresh_when_fingerprint_matches() {
        let index = sample_index();
        assert!(index.is_fresh(69, 1_700_000_000_000));
    }

    #[test]
    fn test_stale_when_len_changes() {
        let index = sample_index();
        assert!(!index.is_fresh(70, 1_700_000_000_000));
    }

    #[test]
    fn test_stale_when_mtime_changes() {
        let index = sample_index();
        assert!(!index.is_fresh(69, 1_700_000_000_001));
    }

    #[test]
    fn test_stale_when_row_count_implausible() {
        // 5 rows claimed for a 10 000-byte file fails ⌊S/50⌋ ≤ rows.
        let index = RowIndex::new(5, 2, vec![0, 26, 57], 10_000, 42).unwrap();
        assert!(!index.is_fresh(10_000, 42));
    }

    #[test]
    fn test_empty_file_is_plausible() {
        let index = RowIndex::new(0, 1000, vec![], 0, 42).unwrap();
        assert!(index.is_fresh(0, 42));
    }
}
