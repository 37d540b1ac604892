//! Entity state recorder — the host side of published views.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use snapcam_app::ports::{NotificationSink, StatePublisher};
use snapcam_domain::entity::EntityUpdate;
use snapcam_domain::error::SnapcamError;

use crate::bus::InProcessBus;

/// Keeps the latest [`EntityUpdate`] of every entity.
///
/// When built [`with_bus`](Self::with_bus), each published state is also
/// set on the bus, so one instance's views can trigger another instance.
#[derive(Default)]
pub struct StateRecorder {
    entities: Mutex<BTreeMap<String, EntityUpdate>>,
    bus: Option<Arc<InProcessBus>>,
}

impl StateRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bus(bus: Arc<InProcessBus>) -> Self {
        Self {
            entities: Mutex::default(),
            bus: Some(bus),
        }
    }

    /// Latest update of `entity_id`.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<EntityUpdate> {
        self.lock_entities().get(entity_id).cloned()
    }

    /// Every recorded entity, ordered by entity id.
    #[must_use]
    pub fn all(&self) -> Vec<EntityUpdate> {
        self.lock_entities().values().cloned().collect()
    }

    fn lock_entities(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, EntityUpdate>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatePublisher for StateRecorder {
    async fn publish_state(&self, update: EntityUpdate) -> Result<(), SnapcamError> {
        let previous = self
            .lock_entities()
            .insert(update.entity_id.clone(), update.clone());
        let changed = previous.is_none_or(|previous| previous.state != update.state);
        if changed && let Some(bus) = &self.bus {
            bus.set_state(&update.entity_id, &update.state);
        }
        Ok(())
    }
}
