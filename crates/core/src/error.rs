//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Network-facing failures get their own cloneable enum so a fallback chain
//! can hold on to the last one it saw.

use thiserror::Error;

/// The top-level error type for Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Answering service errors ---
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single attempt against an answering endpoint.
///
/// The `Display` text of these variants is what ends up in the transcript
/// when the whole cycle fails, so keep it readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("HTTP error! status: {status_code}")]
    Status { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Service not configured: {0}")]
    NotConfigured(String),
}
