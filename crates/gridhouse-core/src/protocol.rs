//! Wire Protocol
//!
//! JSON messages exchanged with viewport clients over the WebSocket. Every
//! message is self-describing via a `"type"` tag; payload fields are
//! camelCase:
//!
//! ```text
//! {"type":"metadata_request"}
//! {"type":"metadata_response","maxRows":5,"maxCols":2}
//! {"type":"slice_request","screenWidth":1000,...,"scrollTop":0}
//! {"type":"slice_response","startRow":0,"rowCount":3,...,"cellsByRow":[[..]]}
//! {"type":"error","message":"..."}
//! ```
//!
//! Decoding failures are the dispatcher's problem: it answers with an
//! `error` message and keeps the connection open.

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Ask for the table dimensions.
    MetadataRequest,
    /// Ask for the slice covering a pixel viewport.
    SliceRequest(Viewport),
}

/// Messages the server sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerResponse {
    MetadataResponse(MetadataResponse),
    SliceResponse(SliceResponse),
    Error(ErrorResponse),
}

/// Table dimensions, answered to a `metadata_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub max_rows: u64,
    pub max_cols: u32,
}

/// A rectangular block of decoded cells, answered to a `slice_request`.
///
/// `row_count`/`col_count` are the *actual* dimensions of `cells_by_row`,
/// which may be smaller than requested near the table edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceResponse {
    pub start_row: u64,
    pub row_count: u32,
    pub start_col: u32,
    pub col_count: u32,
    pub col_letters: Vec<String>,
    pub cells_by_row: Vec<Vec<String>>,
}

/// Request-level failure; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ServerResponse {
    /// Shorthand for an error reply.
    pub fn error(message: impl Into<String>) -> Self {
        ServerResponse::Error(ErrorResponse {
            message: message.into(),
        })
    }
}
