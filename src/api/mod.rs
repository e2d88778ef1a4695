pub mod client;

pub use client::{ApiClient, RewriteStyle};

/// Failure kinds for backend calls.
///
/// 401 is its own variant so callers can clear the session; every other
/// error response surfaces its `detail` message verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session expired. Please log in again.")]
    Unauthorized,
    #[error("{detail}")]
    Api { status: u16, detail: String },
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
