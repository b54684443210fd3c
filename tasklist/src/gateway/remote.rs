//! WebSocket gateway to a `tasklist-store` server.
//!
//! Each gateway call sends one [`StoreRequest`] with a fresh request id and
//! waits for the [`StoreResponse`] carrying the same id. A background reader
//! task routes responses to their callers, so calls may complete in any
//! order. Calls have no timeout and are never retried; when the connection
//! drops, every outstanding and future call fails with `connection closed`.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tasklist_proto::document::{Document, DocumentFields, DocumentId};
use tasklist_proto::store::{self, StoreOp, StoreOutcome, StoreRequest, UNKNOWN_REQUEST_ID};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::{Gateway, GatewayError, GatewayResult};

/// Type alias for the write half of a WebSocket connection.
type WsSender = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;

/// Type alias for the read half of a WebSocket connection.
type WsReader =
    futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>>;

/// Callers waiting for a response, keyed by request id.
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<StoreOutcome>>>>;

const CONNECTION_CLOSED: &str = "connection closed";

/// Gateway speaking the store wire protocol over WebSocket.
pub struct RemoteGateway {
    /// The store server URL (ws:// or wss://).
    store_url: String,
    /// Write half of the WebSocket connection.
    ws_sender: tokio::sync::Mutex<WsSender>,
    /// Outstanding requests awaiting a response.
    pending: PendingMap,
    /// Next request id to hand out. Starts at 1; 0 is reserved.
    next_request_id: AtomicU64,
    /// Whether the WebSocket connection is still up.
    connected: Arc<AtomicBool>,
    /// Handle to the background reader task.
    reader_handle: tokio::task::JoinHandle<()>,
}

impl RemoteGateway {
    /// Connects to a store server.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidUrl`] if `store_url` is not a ws/wss URL.
    /// - [`GatewayError::Timeout`] if the handshake exceeds `connect_timeout`.
    /// - [`GatewayError::Unreachable`] if the server cannot be reached.
    pub async fn connect(store_url: &str, connect_timeout: Duration) -> Result<Self, GatewayError> {
        validate_url(store_url)?;

        let (ws_stream, _response) = tokio::time::timeout(connect_timeout, connect_async(store_url))
            .await
            .map_err(|_| {
                tracing::warn!(url = store_url, "store connect timed out");
                GatewayError::Timeout
            })?
            .map_err(|e| {
                tracing::warn!(url = store_url, err = %e, "store connect failed");
                map_ws_connect_error(e)
            })?;

        let (ws_sender, ws_reader) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let reader_handle = tokio::spawn(reader_loop(
            ws_reader,
            Arc::clone(&pending),
            Arc::clone(&connected),
        ));

        tracing::info!(url = store_url, "connected to store");

        Ok(Self {
            store_url: store_url.to_string(),
            ws_sender: tokio::sync::Mutex::new(ws_sender),
            pending,
            next_request_id: AtomicU64::new(1),
            connected,
            reader_handle,
        })
    }

    /// Return the store URL this gateway is connected to.
    #[must_use]
    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    /// Whether the connection to the store is still up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Sends one request and waits for its outcome.
    async fn request(&self, op: StoreOp) -> Result<StoreOutcome, String> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let op_name = op.name();
        let bytes = store::encode_request(&StoreRequest { request_id, op })
            .map_err(|e| e.to_string())?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request_id, tx);

        // The reader marks the connection down before it drops pending
        // senders, so a request registered after that point is caught here.
        if !self.is_connected() {
            self.pending.lock().remove(&request_id);
            return Err(CONNECTION_CLOSED.to_string());
        }

        let send_result = {
            let mut sender = self.ws_sender.lock().await;
            sender.send(Message::Binary(bytes.into())).await
        };
        if let Err(e) = send_result {
            tracing::warn!(request_id, op = op_name, err = %e, "store send failed");
            self.connected.store(false, Ordering::SeqCst);
            self.pending.lock().remove(&request_id);
            return Err(CONNECTION_CLOSED.to_string());
        }

        tracing::debug!(request_id, op = op_name, "store request sent");
        rx.await.map_err(|_| CONNECTION_CLOSED.to_string())
    }
}

impl Drop for RemoteGateway {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}

impl Gateway for RemoteGateway {
    async fn list_collection(&self, collection: &str) -> GatewayResult<Vec<Document>> {
        let op = StoreOp::ListCollection {
            collection: collection.to_string(),
        };
        expect_outcome(self.request(op).await, |outcome| match outcome {
            StoreOutcome::Documents(docs) => Some(docs),
            _ => None,
        })
    }

    async fn add_document(
        &self,
        collection: &str,
        fields: DocumentFields,
    ) -> GatewayResult<DocumentId> {
        let op = StoreOp::AddDocument {
            collection: collection.to_string(),
            fields,
        };
        expect_outcome(self.request(op).await, |outcome| match outcome {
            StoreOutcome::Added(id) => Some(id),
            _ => None,
        })
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: DocumentFields,
    ) -> GatewayResult<()> {
        let op = StoreOp::UpdateDocument {
            collection: collection.to_string(),
            id: id.clone(),
            fields,
        };
        expect_outcome(self.request(op).await, expect_done)
    }

    async fn delete_document(&self, collection: &str, id: &DocumentId) -> GatewayResult<()> {
        let op = StoreOp::DeleteDocument {
            collection: collection.to_string(),
            id: id.clone(),
        };
        expect_outcome(self.request(op).await, expect_done)
    }
}

fn expect_done(outcome: StoreOutcome) -> Option<()> {
    matches!(outcome, StoreOutcome::Done).then_some(())
}

/// Normalizes a raw store outcome into a [`GatewayResult`].
///
/// Store errors pass through verbatim; an outcome of the wrong kind is a
/// protocol error.
fn expect_outcome<T>(
    result: Result<StoreOutcome, String>,
    extract: impl FnOnce(StoreOutcome) -> Option<T>,
) -> GatewayResult<T> {
    match result {
        Ok(StoreOutcome::Error(reason)) => GatewayResult::failure(reason),
        Ok(outcome) => {
            let description = format!("{outcome:?}");
            extract(outcome).map_or_else(
                || {
                    tracing::warn!(outcome = %description, "unexpected store response");
                    GatewayResult::failure(format!("unexpected store response: {description}"))
                },
                GatewayResult::ok,
            )
        }
        Err(error) => GatewayResult::failure(error),
    }
}

/// Background task that reads responses and hands them to waiting callers.
///
/// Malformed frames are logged and skipped. On close or error the
/// connection is marked down and all waiting callers are released.
async fn reader_loop(mut ws_reader: WsReader, pending: PendingMap, connected: Arc<AtomicBool>) {
    while let Some(msg_result) = ws_reader.next().await {
        match msg_result {
            Ok(Message::Binary(data)) => match store::decode_response(&data) {
                Ok(response) if response.request_id == UNKNOWN_REQUEST_ID => {
                    tracing::warn!(outcome = ?response.outcome, "store rejected a request");
                }
                Ok(response) => {
                    let waiter = pending.lock().remove(&response.request_id);
                    match waiter {
                        Some(tx) => {
                            let _ = tx.send(response.outcome);
                        }
                        None => {
                            tracing::debug!(
                                request_id = response.request_id,
                                "response for unknown request"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(err = %e, "malformed store frame, skipping");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("store WebSocket closed by server");
                break;
            }
            Ok(_) => {
                // Ignore ping/pong/text/raw frames.
            }
            Err(e) => {
                tracing::warn!(err = %e, "store WebSocket read error");
                break;
            }
        }
    }
    connected.store(false, Ordering::SeqCst);
    let dropped = {
        let mut waiters = pending.lock();
        let count = waiters.len();
        waiters.clear();
        count
    };
    tracing::info!(dropped, "store reader task exiting");
}

/// Checks that a store URL parses and uses a WebSocket scheme.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidUrl`] otherwise.
pub fn validate_url(store_url: &str) -> Result<(), GatewayError> {
    let url = url::Url::parse(store_url)
        .map_err(|e| GatewayError::InvalidUrl(format!("{store_url}: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(GatewayError::InvalidUrl(format!(
            "{store_url}: unsupported scheme '{other}' (expected ws or wss)"
        ))),
    }
}

/// Map a tungstenite connect error to a [`GatewayError`].
fn map_ws_connect_error(err: tokio_tungstenite::tungstenite::Error) -> GatewayError {
    use tokio_tungstenite::tungstenite::Error as WsError;
    match err {
        WsError::Io(io_err) => GatewayError::Unreachable(io_err.to_string()),
        WsError::Http(response) => {
            GatewayError::Unreachable(format!("HTTP error: status {}", response.status()))
        }
        WsError::ConnectionClosed | WsError::AlreadyClosed => GatewayError::ConnectionClosed,
        other => GatewayError::Unreachable(other.to_string()),
    }
}
