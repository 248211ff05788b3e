//! Shared error type for the api crate.

use thiserror::Error;

/// Errors surfaced by backend adapters.
///
/// `Unauthorized` is special: by the time a caller sees it, the session has
/// already been torn down and forced-logout hooks have run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid response payload: {0}")]
    InvalidPayload(#[from] lms_core::Error),
}
