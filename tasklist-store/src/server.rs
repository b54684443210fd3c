//! Store server core: shared state, WebSocket handler, and request dispatch.
//!
//! Each WebSocket connection carries a stream of [`StoreRequest`] frames.
//! Every request is answered with exactly one [`StoreResponse`] on the same
//! connection. Requests on one connection are handled in arrival order.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tasklist_proto::store::{
    self, StoreOp, StoreOutcome, StoreRequest, StoreResponse, UNKNOWN_REQUEST_ID,
};

use crate::config::DEFAULT_MAX_PAYLOAD_SIZE;
use crate::store::DocumentStore;

/// Shared server state.
pub struct StoreState {
    /// The documents being served.
    pub store: DocumentStore,
    /// Maximum allowed request frame size in bytes.
    max_payload_size: usize,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    /// Creates state with an empty memory-only store and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DocumentStore::new(),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }

    /// Creates state with a custom payload limit and a pre-opened store.
    #[must_use]
    pub const fn with_config(max_payload_size: usize, store: DocumentStore) -> Self {
        Self {
            store,
            max_payload_size,
        }
    }

    /// Runs one operation against the store and converts the result into
    /// a wire outcome.
    pub async fn execute(&self, op: StoreOp) -> StoreOutcome {
        let result = match op {
            StoreOp::ListCollection { collection } => self
                .store
                .list(&collection)
                .await
                .map(StoreOutcome::Documents),
            StoreOp::AddDocument { collection, fields } => self
                .store
                .add(&collection, fields)
                .await
                .map(StoreOutcome::Added),
            StoreOp::UpdateDocument {
                collection,
                id,
                fields,
            } => self
                .store
                .update(&collection, &id, fields)
                .await
                .map(|()| StoreOutcome::Done),
            StoreOp::DeleteDocument { collection, id } => self
                .store
                .delete(&collection, &id)
                .await
                .map(|()| StoreOutcome::Done),
        };
        result.unwrap_or_else(|e| StoreOutcome::Error(e.to_string()))
    }
}

/// Handles an upgraded WebSocket connection for a single client.
pub async fn handle_socket(socket: WebSocket, state: Arc<StoreState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    tracing::info!("client connected");

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let response = match msg {
            Message::Binary(data) => handle_binary_message(&data, &state).await,
            Message::Close(_) => {
                tracing::info!("received close frame");
                break;
            }
            _ => {
                // Ignore text, ping, pong frames.
                continue;
            }
        };

        if let Err(e) = send_response(&mut ws_sender, &response).await {
            tracing::warn!(error = %e, "failed to send response, dropping connection");
            break;
        }
    }

    tracing::info!("client disconnected");
}

/// Decodes and executes one request frame, always producing a response.
async fn handle_binary_message(data: &[u8], state: &StoreState) -> StoreResponse {
    // Errors go back under the sender's id whenever it can be read, so the
    // caller waiting on it is released.
    let error_id = || store::peek_request_id(data).unwrap_or(UNKNOWN_REQUEST_ID);

    if data.len() > state.max_payload_size {
        let request_id = error_id();
        tracing::warn!(
            request_id,
            size = data.len(),
            max = state.max_payload_size,
            "request exceeds size limit"
        );
        return StoreResponse {
            request_id,
            outcome: StoreOutcome::Error(format!(
                "request too large: {} bytes (max {})",
                data.len(),
                state.max_payload_size
            )),
        };
    }

    let StoreRequest { request_id, op } = match store::decode_request(data) {
        Ok(request) => request,
        Err(e) => {
            let request_id = error_id();
            tracing::warn!(request_id, error = %e, "failed to decode request");
            return StoreResponse {
                request_id,
                outcome: StoreOutcome::Error(format!("malformed request: {e}")),
            };
        }
    };

    let op_name = op.name();
    let collection = op.collection().to_string();
    let outcome = state.execute(op).await;
    match &outcome {
        StoreOutcome::Error(reason) => {
            tracing::warn!(request_id, op = op_name, %collection, %reason, "request failed");
        }
        _ => {
            tracing::debug!(request_id, op = op_name, %collection, "request served");
        }
    }

    StoreResponse {
        request_id,
        outcome,
    }
}

/// Encodes and sends a response directly on a WebSocket sender.
async fn send_response(
    ws_sender: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    response: &StoreResponse,
) -> Result<(), String> {
    let bytes = store::encode_response(response).map_err(|e| e.to_string())?;
    ws_sender
        .send(Message::Binary(bytes.into()))
        .await
        .map_err(|e| format!("WebSocket send error: {e}"))
}

/// Starts the store server on the given address with an empty store and
/// returns the bound address and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StoreState::new())).await
}

/// Starts the store server with pre-configured [`StoreState`].
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StoreState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "store server error");
        }
    });

    Ok((bound_addr, handle))
}

/// axum handler that upgrades an HTTP request to a WebSocket connection.
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    axum::extract::State(state): axum::extract::State<Arc<StoreState>>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
