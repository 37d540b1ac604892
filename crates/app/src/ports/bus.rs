//! Notification bus ports — state changes and events delivered by the host.

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use snapcam_domain::notification::{Notification, StateChange};

/// Delivers host notifications to interested subscribers.
///
/// Each call returns an independent receiver that gets every notification
/// published *after* the call. Dropping the receiver unsubscribes.
pub trait NotificationSource: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<Notification>;
}

/// Injects state changes and events into the host bus.
///
/// Only hosts that let snapcam drive them (the in-process one) implement it.
pub trait NotificationSink: Send + Sync {
    /// Set `entity_id` to `value` and broadcast the resulting transition.
    fn set_state(&self, entity_id: &str, value: &str) -> StateChange;

    fn fire_event(&self, event_type: &str, data: Map<String, Value>);
}

impl<T: NotificationSource> NotificationSource for std::sync::Arc<T> {
    fn subscribe(&self) -> broadcast::Receiver<Notification> {
        (**self).subscribe()
    }
}

impl<T: NotificationSink> NotificationSink for std::sync::Arc<T> {
    fn set_state(&self, entity_id: &str, value: &str) -> StateChange {
        (**self).set_state(entity_id, value)
    }

    fn fire_event(&self, event_type: &str, data: Map<String, Value>) {
        (**self).fire_event(event_type, data);
    }
}
