//! # snapcam-adapter-fs
//!
//! Implements the `FileSource` port on the local filesystem.
//!
//! Reads run on tokio's blocking pool so a slow disk never stalls the task
//! that handles triggers. Paths arrive already resolved; a missing path or
//! anything that is not a regular file yields no image.

mod error;

pub use error::FsError;

use std::io;
use std::path::{Path, PathBuf};

use snapcam_app::ports::FileSource;
use snapcam_domain::error::SnapcamError;

/// Reads image files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSource;

impl LocalFileSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FileSource for LocalFileSource {
    async fn read_file(&self, path: &Path) -> Result<Option<Vec<u8>>, SnapcamError> {
        let path = path.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || read_regular_file(path))
            .await
            .map_err(FsError::from)??;
        Ok(bytes)
    }
}

fn read_regular_file(path: PathBuf) -> Result<Option<Vec<u8>>, FsError> {
    match std::fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Ok(None),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(FsError::Read { path, source }),
    }
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(FsError::Read { path, source }),
    }
}
