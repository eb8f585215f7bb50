//! GridHouse Server Binary
//!
//! Serves viewport slices of one very large delimited text file over a
//! WebSocket.
//!
//! ## Configuration
//!
//! All configuration is done via environment variables:
//!
//! - `GRIDHOUSE_FILE`: path to the data file (required)
//! - `GRIDHOUSE_ADDR`: bind address (default: 127.0.0.1:4001)
//! - `GRIDHOUSE_INDEX`: cached index path (default: `<file>.ghx`)
//! - `GRIDHOUSE_GRANULARITY`: records between index anchors (default: 1000)
//! - `GRIDHOUSE_COLUMNS`: fields per record (default: 2)
//! - `GRIDHOUSE_DELIMITER`: single-byte field separator (default: `;`)
//!
//! ## Logging
//!
//! Controlled via `RUST_LOG` (default: `info`).
//!
//! ## Startup
//!
//! The index is loaded — or rebuilt with a full scan — *before* the
//! listener binds, so the first client request never pays the scan.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use gridhouse_server::{create_router, AppState};
use gridhouse_storage::{Table, TableConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_addr: SocketAddr = std::env::var("GRIDHOUSE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:4001".to_string())
        .parse()?;

    let file_path = PathBuf::from(
        std::env::var("GRIDHOUSE_FILE").map_err(|_| "GRIDHOUSE_FILE must point at the data file")?,
    );
    let index_path = std::env::var("GRIDHOUSE_INDEX").ok().map(PathBuf::from);
    let granularity = match std::env::var("GRIDHOUSE_GRANULARITY") {
        Ok(value) => value.parse::<u64>()?,
        Err(_) => 1000,
    };
    let columns = match std::env::var("GRIDHOUSE_COLUMNS") {
        Ok(value) => value.parse::<u32>()?,
        Err(_) => 2,
    };
    let delimiter = match std::env::var("GRIDHOUSE_DELIMITER") {
        Ok(value) if value.len() == 1 => value.as_bytes()[0],
        Ok(value) => return Err(format!("GRIDHOUSE_DELIMITER must be one byte, got {value:?}").into()),
        Err(_) => b';',
    };

    let config = TableConfig {
        file_path,
        index_path,
        granularity,
        columns,
        delimiter,
        ..Default::default()
    };

    tracing::info!(
        file = ?config.file_path,
        index = ?config.resolved_index_path(),
        granularity,
        "opening table"
    );
    let table = tokio::task::spawn_blocking(move || Table::open(config)).await??;
    tracing::info!(
        total_rows = table.total_rows(),
        columns = table.columns(),
        "table ready"
    );

    let state = AppState {
        table: Arc::new(table),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("WebSocket server listening on ws://{bind_addr}/ws");
    axum::serve(listener, app).await?;
    Ok(())
}
