//! Cooldown Gate — per-instance rate limit on automatic snapshot attempts.

use snapcam_domain::cooldown::Cooldown;
use snapcam_domain::time::now;

use crate::store::SnapshotStore;

/// Decides at trigger time whether an automatic snapshot may start.
///
/// Only *completed* updates count: attempts still in flight do not close the
/// window, so two triggers arriving before either fetch finishes may both pass.
#[derive(Clone)]
pub struct CooldownGate {
    cooldown: Cooldown,
    store: SnapshotStore,
}

impl CooldownGate {
    #[must_use]
    pub fn new(cooldown: Cooldown, store: SnapshotStore) -> Self {
        Self { cooldown, store }
    }

    #[must_use]
    pub fn allowed(&self) -> bool {
        let last = self.store.last_update();
        let now = now();
        let allowed = self.cooldown.allows(last, now);
        if !allowed {
            let remaining = self.cooldown.remaining(last, now);
            tracing::debug!(
                remaining_ms = remaining.num_milliseconds(),
                "cooldown active, skipping trigger"
            );
        }
        allowed
    }
}
