//! Snapshot — the current/previous image tuple shared by one instance.

use std::sync::Arc;

use crate::placeholder::PLACEHOLDER_JPEG;
use crate::time::Timestamp;

/// Raw image bytes, cheaply cloneable.
pub type Image = Arc<[u8]>;

/// Everything readers may observe about the latest snapshot.
///
/// The four fields only ever change together through [`rotate`](Self::rotate).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub current: Option<Image>,
    pub previous: Option<Image>,
    pub last_update: Option<Timestamp>,
    pub last_source: Option<String>,
}

impl Snapshot {
    /// Shift `current` into `previous` and install freshly fetched bytes.
    pub fn rotate(&mut self, bytes: Image, label: String, at: Timestamp) {
        self.previous = self.current.replace(bytes);
        self.last_update = Some(at);
        self.last_source = Some(label);
    }

    /// Image served by the primary camera view.
    #[must_use]
    pub fn primary_image(&self) -> Option<Image> {
        self.current.clone()
    }

    /// Image served by the secondary "last image" view.
    ///
    /// Falls back to `current`, then to the built-in placeholder.
    #[must_use]
    pub fn secondary_image(&self) -> Image {
        self.previous
            .as_ref()
            .or(self.current.as_ref())
            .cloned()
            .unwrap_or_else(|| Image::from(PLACEHOLDER_JPEG))
    }
}
