//! Image source ports — one per [`SourceKind`](snapcam_domain::pair::SourceKind).
//!
//! Every port answers `Ok(None)` when the source simply has no image, and
//! `Err` when it failed. The [`SourceFetcher`](crate::fetcher::SourceFetcher)
//! collapses both into "no bytes".

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use snapcam_domain::error::SnapcamError;

/// Current image of another camera-like entity of the host.
pub trait CameraSource: Send + Sync {
    fn camera_image(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send;
}

/// Contents of a local file, read without blocking the async runtime.
pub trait FileSource: Send + Sync {
    /// `Ok(None)` when `path` does not exist or is not a regular file.
    fn read_file(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send;
}

/// Body of an HTTP GET.
pub trait UrlSource: Send + Sync {
    /// `Ok(None)` for any response other than `200 OK`.
    fn get(&self, url: &str) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send;
}

impl<T: CameraSource> CameraSource for Arc<T> {
    fn camera_image(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send {
        (**self).camera_image(entity_id)
    }
}

impl<T: FileSource> FileSource for Arc<T> {
    fn read_file(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send {
        (**self).read_file(path)
    }
}

impl<T: UrlSource> UrlSource for Arc<T> {
    fn get(&self, url: &str) -> impl Future<Output = Result<Option<Vec<u8>>, SnapcamError>> + Send {
        (**self).get(url)
    }
}
