//! calcfield API server module
//!
//! Provides the HTTP REST API for host applications.
//! Run with `calcfield-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
