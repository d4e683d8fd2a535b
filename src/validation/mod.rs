//! Request gatekeeping: payloads and filter objects are checked against the
//! table binding before any storage call is made.

pub mod filter;
pub mod payload;

pub use filter::{validate_filter, FilterKind};
pub use payload::{validate_create, SchemaMode, ValidationSchema};

/// First violation found in a request, phrased for the client
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub(crate) fn not_allowed(path: &str) -> Self {
        Self::new(format!("\"{}\" is not allowed", path))
    }
}
