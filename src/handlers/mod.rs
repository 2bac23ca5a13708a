//! HTTP request handlers for the gateway.
//!
//! Handlers follow a consistent pattern:
//! - Input validation with stable error codes, before any database work
//! - Tracing for observability
//! - Standardized error responses via [`crate::error::ApiError`]
//!
//! # Handler organization
//!
//! - `exec_proc` - batch change execution against the stored procedure
//! - `health` - liveness probe

pub mod exec_proc;
pub mod health;

pub use exec_proc::exec_proc;
pub use health::health_check;
