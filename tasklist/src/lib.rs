//! `tasklist` — terminal to-do list backed by a document store.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod gateway;
pub mod tasks;
pub mod ui;
