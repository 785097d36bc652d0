//! Shared domain types for the Comanda order platform
//!
//! This crate holds the wire-level data model (orders, customers, reports)
//! and the unified error system used by the service crates.

pub mod error;
pub mod models;

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
