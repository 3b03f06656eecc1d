//! navdesk: a self-hosted bookmark and navigation dashboard.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod config;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
