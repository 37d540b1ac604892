//! Snapshot Store — the shared current/previous image holder of one instance.
//!
//! Backed by a tokio [`watch`] channel: readers always borrow a whole
//! [`Snapshot`] tuple and observers are woken on every rotation.

use std::sync::Arc;

use tokio::sync::watch;

use snapcam_domain::snapshot::{Image, Snapshot};
use snapcam_domain::time::Timestamp;

/// Cloneable handle to the snapshot of one instance.
///
/// Every clone refers to the same tuple.
#[derive(Clone)]
pub struct SnapshotStore {
    sender: Arc<watch::Sender<Snapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Snapshot::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Copy of the current tuple.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn last_update(&self) -> Option<Timestamp> {
        self.sender.borrow().last_update
    }

    /// Rotate the four fields as one step and wake observers.
    pub fn rotate(&self, bytes: Image, label: String, at: Timestamp) {
        self.sender
            .send_modify(|snapshot| snapshot.rotate(bytes, label, at));
    }

    /// Receiver notified after each rotation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use snapcam_domain::time::now;

    use super::*;

    #[test]
    fn should_share_tuple_between_clones() {
        let store = SnapshotStore::new();
        let other = store.clone();
        store.rotate(Image::from(&b"jpeg"[..]), "camera.a".to_string(), now());
        assert_eq!(other.snapshot().current.as_deref(), Some(&b"jpeg"[..]));
        assert_eq!(other.snapshot().last_source.as_deref(), Some("camera.a"));
    }

    #[test]
    fn should_rotate_without_observers() {
        let store = SnapshotStore::new();
        store.rotate(Image::from(&b"a"[..]), "a".to_string(), now());
        store.rotate(Image::from(&b"b"[..]), "b".to_string(), now());
        let snapshot = store.snapshot();
        assert_eq!(snapshot.previous.as_deref(), Some(&b"a"[..]));
        assert_eq!(snapshot.current.as_deref(), Some(&b"b"[..]));
    }

    #[tokio::test]
    async fn should_wake_observer_with_complete_tuple() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();
        let at = now();

        store.rotate(Image::from(&b"jpeg"[..]), "camera.a".to_string(), at);

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.current.as_deref(), Some(&b"jpeg"[..]));
        assert_eq!(seen.last_update, Some(at));
        assert_eq!(seen.last_source.as_deref(), Some("camera.a"));
    }

    #[tokio::test]
    async fn should_never_expose_partial_rotation_to_concurrent_readers() {
        let store = SnapshotStore::new();
        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let snapshot = store.snapshot();
                    if let Some(current) = &snapshot.current {
                        let label = snapshot.last_source.as_deref().unwrap();
                        assert_eq!(current.as_ref(), label.as_bytes());
                        assert!(snapshot.last_update.is_some());
                    } else {
                        assert!(snapshot.last_update.is_none());
                        assert!(snapshot.last_source.is_none());
                    }
                    tokio::task::yield_now().await;
                }
            })
        };
        for i in 0..200 {
            let label = format!("pair-{i}");
            store.rotate(Image::from(label.as_bytes()), label, now());
            tokio::task::yield_now().await;
        }
        reader.await.unwrap();
    }
}
