//! Filesystem-specific error type.

use std::path::PathBuf;

use snapcam_domain::error::SnapcamError;

/// Errors raised while reading an image file.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking read task panicked or was cancelled.
    #[error("file read task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl From<FsError> for SnapcamError {
    fn from(err: FsError) -> Self {
        Self::Source(Box::new(err))
    }
}
