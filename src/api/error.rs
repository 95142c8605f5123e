//! Error types used inside the API client.

use thiserror::Error;

/// Failure of a single backend call.
///
/// Never escapes the public client operations; see [`super::ApiClient`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be completed, or the body could not be read.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend answered with a non-success status.
    #[error("API error ({status})")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, when there was a readable one.
        detail: Option<String>,
    },
}

impl ApiError {
    /// Whether this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
