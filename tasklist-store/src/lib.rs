//! Tasklist document store library.
//!
//! Exposes the store server for use in tests and embedding. The server
//! accepts WebSocket connections and answers document requests against
//! an in-memory [`store::DocumentStore`], optionally backed by a JSON
//! snapshot file.

pub mod config;
pub mod server;
pub mod store;
