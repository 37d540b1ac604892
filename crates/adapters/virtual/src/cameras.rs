//! Virtual cameras — images registered by entity id.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use snapcam_app::ports::CameraSource;
use snapcam_domain::error::SnapcamError;

/// Camera-like entities whose current image is set by hand.
#[derive(Default)]
pub struct VirtualCameras {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl VirtualCameras {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image `entity_id` returns from now on.
    pub fn set_image(&self, entity_id: &str, bytes: impl Into<Vec<u8>>) {
        self.lock_images()
            .insert(entity_id.to_string(), bytes.into());
    }

    /// Make `entity_id` return no image.
    pub fn clear(&self, entity_id: &str) {
        self.lock_images().remove(entity_id);
    }

    fn lock_images(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CameraSource for VirtualCameras {
    async fn camera_image(&self, entity_id: &str) -> Result<Option<Vec<u8>>, SnapcamError> {
        Ok(self.lock_images().get(entity_id).cloned())
    }
}
