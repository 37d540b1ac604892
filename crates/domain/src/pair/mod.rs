//! Trigger Pair — one image source bound to one firing condition.
//!
//! A pair is immutable once built. The owning
//! [`InstanceConfig`](crate::config::InstanceConfig) replaces its whole list
//! of pairs on reconfiguration.

mod source;
mod trigger;

pub use source::{Source, SourceKind};
pub use trigger::{EventFilter, EventTrigger, StateTrigger, Trigger, TriggerType};

use serde::Serialize;
use serde_json::json;

/// A configured rule: fetch from [`Source`] whenever [`Trigger`] fires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerPair {
    pub source: Source,
    pub trigger: Trigger,
}

impl TriggerPair {
    #[must_use]
    pub fn new(source: Source, trigger: Trigger) -> Self {
        Self { source, trigger }
    }

    /// Human-readable identifier recorded as `last_source_label`.
    #[must_use]
    pub fn label(&self) -> String {
        self.source.label()
    }

    /// Flat attribute representation published alongside the camera entity.
    #[must_use]
    pub fn to_attribute(&self) -> serde_json::Value {
        let (camera, file_path, url) = match &self.source {
            Source::Entity { camera } => (Some(camera.clone()), None, None),
            Source::File { path } => (None, Some(path.display().to_string()), None),
            Source::Url { url } => (None, None, Some(url.clone())),
        };
        let mut attr = json!({
            "source_kind": self.source.kind(),
            "camera": camera,
            "file_path": file_path,
            "url": url,
            "trigger_type": self.trigger.trigger_type(),
        });
        let extra = match &self.trigger {
            Trigger::State(state) => json!({
                "entity_id": state.entity_id,
                "to": state.to,
                "from": state.from,
            }),
            Trigger::Event(event) => json!({
                "event_type": event.event_type,
                "event_data": event.filter,
            }),
        };
        if let (Some(target), serde_json::Value::Object(extra)) = (attr.as_object_mut(), extra) {
            target.extend(extra);
        }
        attr
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn should_label_entity_pair_with_camera_id() {
        let pair = TriggerPair::new(
            Source::Entity {
                camera: "camera.porch".to_string(),
            },
            Trigger::State(StateTrigger::new("binary_sensor.motion")),
        );
        assert_eq!(pair.label(), "camera.porch");
    }

    #[test]
    fn should_flatten_state_pair_into_attribute() {
        let pair = TriggerPair::new(
            Source::File {
                path: PathBuf::from("/config/www/latest.jpg"),
            },
            Trigger::State(StateTrigger::new("binary_sensor.motion").from_state("off")),
        );
        let attr = pair.to_attribute();
        assert_eq!(attr["source_kind"], "file");
        assert_eq!(attr["file_path"], "/config/www/latest.jpg");
        assert_eq!(attr["camera"], serde_json::Value::Null);
        assert_eq!(attr["trigger_type"], "state");
        assert_eq!(attr["entity_id"], "binary_sensor.motion");
        assert_eq!(attr["to"], "on");
        assert_eq!(attr["from"], "off");
    }

    #[test]
    fn should_flatten_event_pair_into_attribute() {
        let pair = TriggerPair::new(
            Source::Url {
                url: "http://cam.local/snap.jpg".to_string(),
            },
            Trigger::Event(EventTrigger::new("doorbell", None)),
        );
        let attr = pair.to_attribute();
        assert_eq!(attr["source_kind"], "url");
        assert_eq!(attr["event_type"], "doorbell");
        assert_eq!(attr["event_data"], serde_json::Value::Null);
        assert!(attr.get("entity_id").is_none());
    }
}
