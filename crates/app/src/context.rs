//! Per-instance context handed to every component at construction.

use std::sync::Arc;

use snapcam_domain::config::InstanceConfig;
use snapcam_domain::entity::ViewIds;
use snapcam_domain::id::InstanceId;
use snapcam_domain::snapshot::Image;
use snapcam_domain::time::Timestamp;

use crate::gate::CooldownGate;
use crate::store::SnapshotStore;
use crate::views::TriggerPulse;

/// Everything one configured instance shares between its components.
///
/// Cheap to clone. Owned by [`SnapcamInstance`](crate::instance::SnapcamInstance),
/// never registered in any process-wide map.
#[derive(Clone)]
pub struct InstanceContext {
    pub id: InstanceId,
    pub config: Arc<InstanceConfig>,
    pub views: ViewIds,
    pub store: SnapshotStore,
    pub pulse: TriggerPulse,
}

impl InstanceContext {
    /// Fresh context with an empty store.
    #[must_use]
    pub fn new(config: InstanceConfig) -> Self {
        Self::with_state(
            InstanceId::new(),
            config,
            SnapshotStore::new(),
            TriggerPulse::new(),
        )
    }

    /// Context reusing the store and pulse of a previous configuration.
    #[must_use]
    pub fn with_state(
        id: InstanceId,
        config: InstanceConfig,
        store: SnapshotStore,
        pulse: TriggerPulse,
    ) -> Self {
        let views = ViewIds::for_name(&config.name);
        Self {
            id,
            config: Arc::new(config),
            views,
            store,
            pulse,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Rotate the store and start the triggered pulse, with no await in between.
    pub fn record_snapshot(&self, bytes: Image, label: String, at: Timestamp) {
        self.store.rotate(bytes, label, at);
        self.pulse.trigger();
    }

    #[must_use]
    pub fn gate(&self) -> CooldownGate {
        CooldownGate::new(self.config.cooldown, self.store.clone())
    }
}
