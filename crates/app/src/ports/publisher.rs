//! State publisher port — pushes entity updates to the host.

use std::future::Future;

use snapcam_domain::entity::EntityUpdate;
use snapcam_domain::error::SnapcamError;

/// Publishes entity state and attributes for the host to read.
pub trait StatePublisher: Send + Sync {
    fn publish_state(
        &self,
        update: EntityUpdate,
    ) -> impl Future<Output = Result<(), SnapcamError>> + Send;
}

impl<T: StatePublisher> StatePublisher for std::sync::Arc<T> {
    fn publish_state(
        &self,
        update: EntityUpdate,
    ) -> impl Future<Output = Result<(), SnapcamError>> + Send {
        (**self).publish_state(update)
    }
}
