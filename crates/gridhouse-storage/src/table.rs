//! Table Lifecycle
//!
//! One `Table` = one immutable data file + its row index + a slicer over
//! both. Opening a table is where the load-or-build policy lives:
//!
//! ```text
//! Table::open(config)
//!     ↓
//! stat the data file (missing file is fatal)
//!     ↓
//! load cached index ── absent ──────────────┐
//!     │                                     │
//!     ├─ unreadable/corrupt → warn ─────────┤
//!     ├─ wrong granularity or stale ────────┤
//!     ↓                                     ↓
//! accept                            full scan + persist
//! ```
//!
//! A bad *cache* is never fatal — the scan recreates it. A bad *data file*
//! always is. Once open, the index is shared read-only behind `Arc` and the
//! table never mutates again.

use std::sync::Arc;

use crate::config::TableConfig;
use crate::error::Result;
use crate::index::{builder, codec, mtime_millis, RowIndex};
use crate::slicer::{Slice, Slicer};

/// An indexed, sliceable view over one delimited text file.
pub struct Table {
    columns: u32,
    index: Arc<RowIndex>,
    slicer: Slicer,
}

impl Table {
    /// Open the data file, loading the cached index or building a fresh one.
    ///
    /// Blocks for the duration of a full-file scan when no usable cache
    /// exists; call it before accepting client traffic.
    pub fn open(config: TableConfig) -> Result<Self> {
        let metadata = std::fs::metadata(&config.file_path)?;
        let source_len = metadata.len();
        let source_mtime_ms = mtime_millis(&metadata);
        let index_path = config.resolved_index_path();

        let cached = match codec::load(&index_path) {
            Ok(cached) => cached,
            Err(err) => {
                tracing::warn!(
                    path = ?index_path,
                    error = %err,
                    "cached row index unreadable, rebuilding"
                );
                None
            }
        };

        let index = match cached {
            Some(index)
                if index.granularity() == config.granularity
                    && index.is_fresh(source_len, source_mtime_ms) =>
            {
                tracing::info!(
                    path = ?index_path,
                    total_rows = index.total_rows(),
                    "cached row index accepted"
                );
                index
            }
            Some(index) => {
                tracing::info!(
                    path = ?index_path,
                    cached_rows = index.total_rows(),
                    cached_granularity = index.granularity(),
                    "cached row index stale, rebuilding"
                );
                Self::rebuild(&config, &index_path)?
            }
            None => Self::rebuild(&config, &index_path)?,
        };

        let index = Arc::new(index);
        let slicer = Slicer::open(&config, index.clone())?;
        Ok(Self {
            columns: config.columns,
            index,
            slicer,
        })
    }

    fn rebuild(config: &TableConfig, index_path: &std::path::Path) -> Result<RowIndex> {
        let index = builder::build(&config.file_path, config.granularity, config.scan_chunk_size)?;
        codec::write(&index, index_path)?;
        Ok(index)
    }

    /// Number of records in the table.
    pub fn total_rows(&self) -> u64 {
        self.index.total_rows()
    }

    /// Number of columns per record.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// The shared row index.
    pub fn index(&self) -> &Arc<RowIndex> {
        &self.index
    }

    /// Fetch a clamped rectangle of cells. See [`Slicer::get_slice`].
    pub fn get_slice(
        &self,
        start_row: u64,
        row_count: u32,
        start_col: u32,
        col_count: u32,
    ) -> Result<Slice> {
        self.slicer
            .get_slice(start_row, row_count, start_col, col_count)
    }
}
