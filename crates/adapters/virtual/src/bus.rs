//! In-process notification bus backed by a tokio broadcast channel.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use snapcam_app::ports::{NotificationSink, NotificationSource};
use snapcam_domain::notification::{BusEvent, Notification, StateChange};

/// Host bus holding the current value of every entity it has seen.
///
/// Publishing succeeds even when nobody listens.
pub struct InProcessBus {
    sender: broadcast::Sender<Notification>,
    states: Mutex<HashMap<String, String>>,
}

impl InProcessBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current value of `entity_id`, if any.
    #[must_use]
    pub fn state(&self, entity_id: &str) -> Option<String> {
        self.lock_states().get(entity_id).cloned()
    }

    /// Forget `entity_id` and broadcast its removal.
    pub fn remove_state(&self, entity_id: &str) -> Option<StateChange> {
        let old = self.lock_states().remove(entity_id)?;
        let change = StateChange::new(entity_id, Some(old), None::<String>);
        self.send(Notification::StateChanged(change.clone()));
        Some(change)
    }

    fn send(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::trace!("notification dropped, no listeners");
        }
    }

    fn lock_states(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl NotificationSource for InProcessBus {
    fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl NotificationSink for InProcessBus {
    /// Setting the same value again still broadcasts, like a host
    /// refreshing an entity.
    fn set_state(&self, entity_id: &str, value: &str) -> StateChange {
        let old = self
            .lock_states()
            .insert(entity_id.to_string(), value.to_string());
        let change = StateChange::new(entity_id, old, Some(value));
        self.send(Notification::StateChanged(change.clone()));
        change
    }

    fn fire_event(&self, event_type: &str, data: Map<String, Value>) {
        self.send(Notification::Event(BusEvent::new(event_type, data)));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn should_broadcast_first_value_without_previous_state() {
        let bus = InProcessBus::default();
        let mut rx = bus.subscribe();

        bus.set_state("binary_sensor.motion", "off");

        let received = rx.recv().await.unwrap();
        assert_eq!(
            received,
            Notification::StateChanged(StateChange::new(
                "binary_sensor.motion",
                None::<String>,
                Some("off")
            ))
        );
    }

    #[tokio::test]
    async fn should_carry_previous_value_in_transition() {
        let bus = InProcessBus::default();
        bus.set_state("binary_sensor.motion", "off");
        let mut rx = bus.subscribe();

        let change = bus.set_state("binary_sensor.motion", "on");

        assert_eq!(change.old.as_deref(), Some("off"));
        assert_eq!(change.new.as_deref(), Some("on"));
        assert_eq!(rx.recv().await.unwrap(), Notification::StateChanged(change));
        assert_eq!(bus.state("binary_sensor.motion").as_deref(), Some("on"));
    }

    #[tokio::test]
    async fn should_broadcast_removal() {
        let bus = InProcessBus::default();
        bus.set_state("binary_sensor.motion", "on");

        let change = bus.remove_state("binary_sensor.motion").unwrap();

        assert!(change.new.is_none());
        assert!(bus.state("binary_sensor.motion").is_none());
        assert!(bus.remove_state("binary_sensor.motion").is_none());
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let Value::Object(data) = json!({"zone": "front"}) else {
            unreachable!()
        };

        bus.fire_event("my_event", data.clone());

        let expected = Notification::Event(BusEvent::new("my_event", data));
        assert_eq!(rx1.recv().await.unwrap(), expected);
        assert_eq!(rx2.recv().await.unwrap(), expected);
    }

    #[test]
    fn should_succeed_when_no_subscribers() {
        let bus = InProcessBus::default();
        bus.set_state("binary_sensor.motion", "on");
        bus.fire_event("doorbell", Map::new());
        assert_eq!(bus.state("binary_sensor.motion").as_deref(), Some("on"));
    }
}
