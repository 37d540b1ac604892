//! HTTP fetch error type wrapping reqwest errors.

use snapcam_domain::error::SnapcamError;

/// Errors raised while fetching an image over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Building the client, connecting, timing out or reading the body failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<FetchError> for SnapcamError {
    fn from(err: FetchError) -> Self {
        Self::Source(Box::new(err))
    }
}
