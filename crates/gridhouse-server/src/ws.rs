//! WebSocket Request Dispatcher
//!
//! One socket per client, one serial request loop per socket. Serial is a
//! feature: responses leave in the order requests complete, which is the
//! ordering the client-side viewport relies on.
//!
//! Every inbound text frame is decoded as a [`ClientRequest`] and answered
//! with exactly one frame: `metadata_response`, `slice_response`, or
//! `error`. Client mistakes never close the connection and never take the
//! process down. Slice reads hit the disk, so they run on the blocking
//! thread pool rather than stalling the socket task.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use gridhouse_core::protocol::{ClientRequest, MetadataResponse, ServerResponse, SliceResponse};
use gridhouse_core::viewport::compute_slice_params;

use crate::AppState;

/// A capped 1000×200 slice of long records fits comfortably under 16 MiB.
const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Upgrade HTTP to WebSocket for the slice protocol.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_BYTES)
        .max_frame_size(MAX_MESSAGE_BYTES)
        .on_upgrade(|socket| handle_socket(socket, state))
}

/// Serve one client until it disconnects.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = dispatch(&state, &text).await;
                let encoded = match serde_json::to_string(&response) {
                    Ok(encoded) => encoded,
                    Err(err) => {
                        tracing::error!(error = %err, "response encoding failed");
                        break;
                    }
                };
                if sender.send(Message::Text(encoded)).await.is_err() {
                    break; // Client disconnected; in-flight work is abandoned.
                }
            }
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
}

/// Decode one request and produce its response.
pub async fn dispatch(state: &AppState, text: &str) -> ServerResponse {
    let request = match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => request,
        Err(err) => return ServerResponse::error(format!("bad request: {err}")),
    };

    match request {
        ClientRequest::MetadataRequest => ServerResponse::MetadataResponse(MetadataResponse {
            max_rows: state.table.total_rows(),
            max_cols: state.table.columns(),
        }),
        ClientRequest::SliceRequest(viewport) => {
            let params =
                compute_slice_params(&viewport, state.table.total_rows(), state.table.columns());
            let table = state.table.clone();
            let result = tokio::task::spawn_blocking(move || {
                table.get_slice(
                    params.start_row,
                    params.row_count,
                    params.start_col,
                    params.col_count,
                )
            })
            .await;

            match result {
                Ok(Ok(slice)) => ServerResponse::SliceResponse(SliceResponse {
                    start_row: slice.start_row,
                    row_count: slice.row_count(),
                    start_col: slice.start_col,
                    col_count: slice.col_count(),
                    col_letters: slice.col_letters,
                    cells_by_row: slice.cells_by_row,
                }),
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "slice read failed");
                    ServerResponse::error("slice read failed")
                }
                Err(err) => {
                    tracing::error!(error = %err, "slice task panicked");
                    ServerResponse::error("internal error")
                }
            }
        }
    }
}
