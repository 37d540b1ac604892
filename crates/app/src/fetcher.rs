//! Source Fetcher — resolves a pair's [`Source`] into raw image bytes.

use std::future::Future;
use std::sync::Arc;

use snapcam_domain::pair::Source;
use snapcam_domain::snapshot::Image;

use crate::ports::{CameraSource, FileSource, UrlSource};

/// Turns a [`Source`] into bytes, or `None` when nothing usable came back.
///
/// Never fails: implementations log and swallow their errors so callers can
/// treat every source kind the same way.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, source: &Source) -> impl Future<Output = Option<Image>> + Send;
}

impl<T: ImageFetcher> ImageFetcher for Arc<T> {
    fn fetch(&self, source: &Source) -> impl Future<Output = Option<Image>> + Send {
        (**self).fetch(source)
    }
}

/// Dispatches each source kind to its port.
pub struct SourceFetcher<C, F, U> {
    camera: C,
    file: F,
    url: U,
}

impl<C, F, U> SourceFetcher<C, F, U>
where
    C: CameraSource,
    F: FileSource,
    U: UrlSource,
{
    pub fn new(camera: C, file: F, url: U) -> Self {
        Self { camera, file, url }
    }
}

impl<C, F, U> ImageFetcher for SourceFetcher<C, F, U>
where
    C: CameraSource,
    F: FileSource,
    U: UrlSource,
{
    async fn fetch(&self, source: &Source) -> Option<Image> {
        let result = match source {
            Source::Entity { camera } => self.camera.camera_image(camera).await,
            Source::File { path } => self.file.read_file(path).await,
            Source::Url { url } => self.url.get(url).await,
        };
        match result {
            Ok(bytes) => bytes.map(Image::from),
            Err(err) => {
                tracing::warn!(
                    %err,
                    source = %source.label(),
                    kind = %source.kind(),
                    "failed to fetch image"
                );
                None
            }
        }
    }
}
