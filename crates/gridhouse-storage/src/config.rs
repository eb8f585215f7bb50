//! Table Configuration
//!
//! Everything the storage layer needs to know about one data file:
//!
//! - **file_path**: the delimited text file to serve
//! - **index_path**: where the cached row index lives (default: `<file>.ghx`)
//! - **granularity**: records between index anchors (default: 1000)
//! - **columns**: fields per record (default: 2)
//! - **delimiter**: single-byte field separator (default: `;`)
//! - **read_buffer_size**: floor for slice reads (default: 32 KiB)
//! - **scan_chunk_size**: block size for the index scan (default: 64 MiB)
//!
//! The sizing knobs are tuning parameters, not contracts; tests shrink them
//! to force chunk boundaries and under-read retries on tiny fixtures.
//!
//! ## Usage
//!
//! ```ignore
//! use gridhouse_storage::TableConfig;
//!
//! let config = TableConfig {
//!     file_path: "/data/measurements.txt".into(),
//!     ..Default::default()
//! };
//! let table = Table::open(config)?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extension given to the cached index next to the data file.
pub const INDEX_FILE_EXTENSION: &str = "ghx";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Path to the immutable delimited data file.
    pub file_path: PathBuf,

    /// Path for the cached index; `None` derives `<file_path>.ghx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_path: Option<PathBuf>,

    /// Records between successive index anchors (default: 1000).
    #[serde(default = "default_granularity")]
    pub granularity: u64,

    /// Fields per record (default: 2).
    #[serde(default = "default_columns")]
    pub columns: u32,

    /// Single-byte field separator (default: `;`).
    #[serde(default = "default_delimiter")]
    pub delimiter: u8,

    /// Minimum bytes fetched per slice read (default: 32 KiB).
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Bytes per chunk during the index scan (default: 64 MiB).
    #[serde(default = "default_scan_chunk_size")]
    pub scan_chunk_size: usize,
}

impl TableConfig {
    /// Index location: configured path, or the data file with `.ghx` appended.
    pub fn resolved_index_path(&self) -> PathBuf {
        match &self.index_path {
            Some(path) => path.clone(),
            None => {
                let mut name = self.file_path.as_os_str().to_os_string();
                name.push(".");
                name.push(INDEX_FILE_EXTENSION);
                PathBuf::from(name)
            }
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            index_path: None,
            granularity: default_granularity(),
            columns: default_columns(),
            delimiter: default_delimiter(),
            read_buffer_size: default_read_buffer_size(),
            scan_chunk_size: default_scan_chunk_size(),
        }
    }
}

fn default_granularity() -> u64 {
    1000
}

fn default_columns() -> u32 {
    2
}

fn default_delimiter() -> u8 {
    b';'
}

fn default_read_buffer_size() -> usize {
    32 * 1024 // 32 KiB
}

fn default_scan_chunk_size() -> usize {
    64 * 1024 * 1024 // 64 MiB
}
