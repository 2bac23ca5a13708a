//! Stored-procedure gateway service.
//!
//! Receives batched change requests over HTTP, normalizes the caller
//! identity, validates payload shape, and forwards the batch as a single
//! stored-procedure invocation, reducing the procedure's result rows into
//! one JSON response.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod payload;
pub mod procedure;
pub mod reduce;
pub mod server;

pub use config::Config;
pub use error::ApiError;
pub use server::{create_router, start_server, AppState};
