//! Shared protocol definitions for the tasklist document store wire format.

pub mod codec;
pub mod document;
pub mod store;
pub mod task;
