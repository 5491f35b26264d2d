//! linkshelf: a workspace-scoped bookmark manager core.
//!
//! Bookmarks live in folder trees, carry tags, and own one or more URLs of
//! which exactly one is primary. This library crate exposes all modules for
//! use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
