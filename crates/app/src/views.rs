//! Derived read-only views — entity state published from the snapshot store.
//!
//! One task per instance watches the [`SnapshotStore`](crate::store::SnapshotStore)
//! and the [`TriggerPulse`]. After each rotation it publishes the camera
//! entities, the two diagnostic sensors and the momentary "triggered"
//! indicator, and republishes the indicator when it reverts after [`PULSE`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use snapcam_domain::entity::{AttributeValue, EntityUpdate};
use snapcam_domain::pair::TriggerPair;
use snapcam_domain::snapshot::Snapshot;
use snapcam_domain::time::to_rfc3339;

use crate::context::InstanceContext;
use crate::ports::StatePublisher;

/// How long the triggered indicator stays on after a rotation.
pub const PULSE: Duration = Duration::from_secs(5);

const STATE_IDLE: &str = "idle";
const STATE_UNKNOWN: &str = "unknown";

/// The triggered indicator, shared across reconfigurations.
///
/// Owns its revert timer: every [`trigger`](Self::trigger) turns it on and
/// restarts the countdown, so it always reverts [`PULSE`] after the last one
/// whatever happens to the tasks publishing it.
#[derive(Clone)]
pub struct TriggerPulse {
    sender: Arc<watch::Sender<bool>>,
    revert: Arc<Mutex<Revert>>,
}

#[derive(Default)]
struct Revert {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Default for TriggerPulse {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerPulse {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            revert: Arc::default(),
        }
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        *self.sender.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Turn the indicator on and restart the revert countdown.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        let mut revert = self.lock_revert();
        revert.generation += 1;
        if let Some(handle) = revert.handle.take() {
            handle.abort();
        }
        self.set(true);

        let generation = revert.generation;
        let pulse = self.clone();
        revert.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(PULSE).await;
            let revert = pulse.lock_revert();
            // a newer trigger owns the indicator now
            if revert.generation == generation {
                pulse.set(false);
            }
        }));
    }

    fn set(&self, on: bool) {
        self.sender.send_if_modified(|current| {
            let changed = *current != on;
            *current = on;
            changed
        });
    }

    fn lock_revert(&self) -> MutexGuard<'_, Revert> {
        self.revert.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publishes the views of one instance.
pub struct ViewPublisher<P> {
    context: InstanceContext,
    publisher: P,
}

impl<P> ViewPublisher<P>
where
    P: StatePublisher + 'static,
{
    pub fn new(context: InstanceContext, publisher: P) -> Self {
        Self { context, publisher }
    }

    /// Publish the current state once, then follow the store until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut changes = self.context.store.subscribe();
        let mut pulse = self.context.pulse.subscribe();
        let initial = changes.borrow_and_update().clone();
        let mut shown = *pulse.borrow_and_update();
        self.publish_all(&initial, shown).await;

        loop {
            tokio::select! {
                // a rotation and its pulse arrive together, publish them once
                biased;
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = changes.borrow_and_update().clone();
                    shown = *pulse.borrow_and_update();
                    self.publish_all(&snapshot, shown).await;
                }
                changed = pulse.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let on = *pulse.borrow_and_update();
                    if on != shown {
                        shown = on;
                        let snapshot = self.context.store.snapshot();
                        self.publish(self.triggered_update(&snapshot, on)).await;
                    }
                }
            }
        }
    }

    async fn publish_all(&self, snapshot: &Snapshot, triggered: bool) {
        for update in self.updates(snapshot, triggered) {
            self.publish(update).await;
        }
    }

    async fn publish(&self, update: EntityUpdate) {
        let entity_id = update.entity_id.clone();
        if let Err(err) = self.publisher.publish_state(update).await {
            tracing::warn!(
                %err,
                instance = %self.context.name(),
                %entity_id,
                "failed to publish view state"
            );
        }
    }

    /// Every entity update describing `snapshot` with the indicator at `triggered`.
    #[must_use]
    pub fn updates(&self, snapshot: &Snapshot, triggered: bool) -> Vec<EntityUpdate> {
        let ids = &self.context.views;
        let last_source = snapshot.last_source.clone();
        let last_update = snapshot.last_update.map(to_rfc3339);

        let mut updates = vec![self.camera_update(&ids.camera, "current", snapshot)];
        if self.context.config.create_last_camera {
            updates.push(self.camera_update(&ids.last_camera, "last", snapshot));
        }
        updates.push(EntityUpdate::new(
            &ids.last_source,
            last_source.as_deref().unwrap_or(STATE_UNKNOWN),
        ));
        updates.push(EntityUpdate::new(
            &ids.last_triggered,
            last_update.as_deref().unwrap_or(STATE_UNKNOWN),
        ));
        updates.push(self.triggered_update(snapshot, triggered));
        updates
    }

    fn camera_update(&self, entity_id: &str, role: &str, snapshot: &Snapshot) -> EntityUpdate {
        let config = &self.context.config;
        let pairs = config.pairs.iter().map(TriggerPair::to_attribute).collect();
        EntityUpdate::new(entity_id, STATE_IDLE)
            .with_attribute(
                "description",
                AttributeValue::String(config.description.clone()),
            )
            .with_attribute(
                "cooldown_minutes",
                AttributeValue::Float(config.cooldown.minutes()),
            )
            .with_attribute("pairs", AttributeValue::Json(Value::Array(pairs)))
            .with_attribute(
                "last_update",
                AttributeValue::from(snapshot.last_update.map(to_rfc3339)),
            )
            .with_attribute(
                "last_source",
                AttributeValue::from(snapshot.last_source.clone()),
            )
            .with_attribute("role", AttributeValue::String(role.to_string()))
    }

    fn triggered_update(&self, snapshot: &Snapshot, on: bool) -> EntityUpdate {
        let state = if on { "on" } else { "off" };
        EntityUpdate::new(&self.context.views.triggered, state).with_attribute(
            "last_triggered",
            AttributeValue::from(snapshot.last_update.map(to_rfc3339)),
        )
    }
}
