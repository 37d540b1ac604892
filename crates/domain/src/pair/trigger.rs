//! Trigger — the notification pattern that fires a snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::notification::{BusEvent, Notification, StateChange, same_value};

/// Tag of a [`Trigger`], as written in configuration records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    State,
    Event,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State => f.write_str("state"),
            Self::Event => f.write_str("event"),
        }
    }
}

impl FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(Self::State),
            "event" => Ok(Self::Event),
            _ => Err(ValidationError::UnknownTriggerType(s.to_string())),
        }
    }
}

/// Describes which notification fires a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    State(StateTrigger),
    Event(EventTrigger),
}

impl Trigger {
    #[must_use]
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::State(_) => TriggerType::State,
            Self::Event(_) => TriggerType::Event,
        }
    }

    /// Check whether a bus notification fires this trigger.
    #[must_use]
    pub fn matches(&self, notification: &Notification) -> bool {
        match (self, notification) {
            (Self::State(trigger), Notification::StateChanged(change)) => trigger.matches(change),
            (Self::Event(trigger), Notification::Event(event)) => trigger.matches(event),
            _ => false,
        }
    }
}

/// Fires when a watched entity transitions into `to`, optionally from `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrigger {
    pub entity_id: String,
    pub to: String,
    /// `None` matches any prior value, including an absent one.
    pub from: Option<String>,
}

impl StateTrigger {
    /// Target value used when a record leaves `to` empty.
    pub const DEFAULT_TO: &'static str = "on";

    /// Watch `entity_id` for a transition into [`DEFAULT_TO`](Self::DEFAULT_TO).
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            to: Self::DEFAULT_TO.to_string(),
            from: None,
        }
    }

    #[must_use]
    pub fn to_state(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    #[must_use]
    pub fn from_state(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Check whether a state change fires this trigger.
    ///
    /// Comparisons ignore case, including non-ASCII letters. A change whose old and new values are
    /// equal never matches.
    #[must_use]
    pub fn matches(&self, change: &StateChange) -> bool {
        if change.entity_id != self.entity_id || change.is_noop() {
            return false;
        }
        let from_ok = match &self.from {
            None => true,
            Some(expected) => change
                .old
                .as_deref()
                .is_some_and(|old| same_value(old, expected)),
        };
        let to_ok = change
            .new
            .as_deref()
            .is_some_and(|new| same_value(new, &self.to));
        from_ok && to_ok
    }
}

/// Key/value pairs that must all be present, with equal values, in an event payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventFilter(Map<String, Value>);

impl EventFilter {
    #[must_use]
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(entries)
    }

    /// Parse a filter written as JSON text.
    ///
    /// Blank text yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the text is not a JSON object.
    pub fn parse(text: &str) -> Result<Option<Self>, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Map<String, Value>>(text).map(|map| Some(Self(map)))
    }

    #[must_use]
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.0
            .iter()
            .all(|(key, expected)| data.get(key) == Some(expected))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fires on every bus event of `event_type` whose payload passes `filter`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTrigger {
    pub event_type: String,
    pub filter: Option<EventFilter>,
}

impl EventTrigger {
    #[must_use]
    pub fn new(event_type: impl Into<String>, filter: Option<EventFilter>) -> Self {
        Self {
            event_type: event_type.into(),
            filter,
        }
    }

    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        if event.event_type != self.event_type {
            return false;
        }
        self.filter
            .as_ref()
            .is_none_or(|filter| filter.matches(&event.data))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn change(old: Option<&str>, new: Option<&str>) -> StateChange {
        StateChange::new("binary_sensor.motion", old, new)
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn should_match_any_previous_value_when_from_is_unset() {
        let trigger = StateTrigger::new("binary_sensor.motion");
        for old in [Some("off"), Some("unavailable"), Some("unknown"), None] {
            assert!(trigger.matches(&change(old, Some("on"))), "old = {old:?}");
        }
    }

    #[test]
    fn should_match_only_exact_previous_value_when_from_is_set() {
        let trigger = StateTrigger::new("binary_sensor.motion").from_state("off");
        assert!(trigger.matches(&change(Some("off"), Some("on"))));
        assert!(!trigger.matches(&change(Some("unavailable"), Some("on"))));
        assert!(!trigger.matches(&change(None, Some("on"))));
    }

    #[test]
    fn should_compare_values_ignoring_case() {
        let trigger = StateTrigger::new("binary_sensor.motion")
            .from_state("Off")
            .to_state("ON");
        assert!(trigger.matches(&change(Some("OFF"), Some("on"))));
    }

    #[test]
    fn should_compare_non_ascii_values_ignoring_case() {
        let trigger = StateTrigger::new("sensor.door")
            .from_state("GESCHLOSSEN")
            .to_state("Geöffnet");
        let change = StateChange::new("sensor.door", Some("geschlossen"), Some("GEÖFFNET"));
        assert!(trigger.matches(&change));
    }

    #[test]
    fn should_treat_non_ascii_case_change_as_noop() {
        let trigger = StateTrigger::new("sensor.mode").to_state("ä");
        let change = StateChange::new("sensor.mode", Some("Ä"), Some("ä"));
        assert!(change.is_noop());
        assert!(!trigger.matches(&change));
    }

    #[test]
    fn should_never_match_noop_transition() {
        let triggers = [
            StateTrigger::new("binary_sensor.motion"),
            StateTrigger::new("binary_sensor.motion").from_state("on"),
            StateTrigger::new("binary_sensor.motion").to_state("off"),
        ];
        for trigger in &triggers {
            assert!(!trigger.matches(&change(Some("on"), Some("on"))));
            assert!(!trigger.matches(&change(Some("On"), Some("oN"))));
            assert!(!trigger.matches(&change(Some("off"), Some("OFF"))));
        }
    }

    #[test]
    fn should_not_match_when_target_differs() {
        let trigger = StateTrigger::new("binary_sensor.motion");
        assert!(!trigger.matches(&change(Some("on"), Some("off"))));
    }

    #[test]
    fn should_not_match_removed_entity() {
        let trigger = StateTrigger::new("binary_sensor.motion");
        assert!(!trigger.matches(&change(Some("off"), None)));
    }

    #[test]
    fn should_not_match_other_entity() {
        let trigger = StateTrigger::new("binary_sensor.door");
        assert!(!trigger.matches(&change(Some("off"), Some("on"))));
    }

    #[test]
    fn should_match_event_without_filter() {
        let trigger = EventTrigger::new("doorbell", None);
        let event = BusEvent::new("doorbell", Map::new());
        assert!(trigger.matches(&event));
    }

    #[test]
    fn should_not_match_event_of_other_type() {
        let trigger = EventTrigger::new("doorbell", None);
        let event = BusEvent::new("call_service", Map::new());
        assert!(!trigger.matches(&event));
    }

    #[test]
    fn should_require_every_filter_key_to_match() {
        let filter = EventFilter::new(payload(json!({"zone": "front"})));
        let trigger = EventTrigger::new("my_event", Some(filter));

        let back = BusEvent::new("my_event", payload(json!({"zone": "back"})));
        let front = BusEvent::new("my_event", payload(json!({"zone": "front", "extra": 1})));
        let missing = BusEvent::new("my_event", payload(json!({"extra": 1})));

        assert!(!trigger.matches(&back));
        assert!(trigger.matches(&front));
        assert!(!trigger.matches(&missing));
    }

    #[test]
    fn should_compare_filter_values_by_json_equality() {
        let filter = EventFilter::new(payload(json!({"count": 1})));
        assert!(filter.matches(&payload(json!({"count": 1}))));
        assert!(!filter.matches(&payload(json!({"count": "1"}))));
    }

    #[test]
    fn should_match_anything_with_empty_filter() {
        let filter = EventFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&Map::new()));
    }

    #[test]
    fn should_parse_filter_from_json_text() {
        let filter = EventFilter::parse(r#"{"zone": "front"}"#).unwrap().unwrap();
        assert!(filter.matches(&payload(json!({"zone": "front"}))));
    }

    #[test]
    fn should_parse_blank_filter_text_as_absent() {
        assert!(EventFilter::parse("   ").unwrap().is_none());
    }

    #[test]
    fn should_fail_to_parse_malformed_filter_text() {
        assert!(EventFilter::parse("{zone: front").is_err());
        assert!(EventFilter::parse("[1, 2]").is_err());
    }

    #[test]
    fn should_dispatch_notifications_by_trigger_kind() {
        let state = Trigger::State(StateTrigger::new("binary_sensor.motion"));
        let event = Trigger::Event(EventTrigger::new("doorbell", None));
        let motion = Notification::StateChanged(change(Some("off"), Some("on")));
        let ring = Notification::Event(BusEvent::new("doorbell", Map::new()));

        assert!(state.matches(&motion));
        assert!(!state.matches(&ring));
        assert!(event.matches(&ring));
        assert!(!event.matches(&motion));
    }

    #[test]
    fn should_parse_trigger_type_tags() {
        assert_eq!("state".parse::<TriggerType>().unwrap(), TriggerType::State);
        assert_eq!("EVENT".parse::<TriggerType>().unwrap(), TriggerType::Event);
        assert!("time".parse::<TriggerType>().is_err());
    }
}
