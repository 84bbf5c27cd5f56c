//! BookmarkPro — a bookmark library with tag filtering, durable local storage
//! and optional sync to a private cloud-drive document.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
