//! Host entities exposed by one snapcam instance.
//!
//! The host owns the entity lifecycle; snapcam only publishes
//! [`EntityUpdate`]s for the ids listed in [`ViewIds`].

mod attribute_value;

pub use attribute_value::AttributeValue;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// State and attributes published for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl EntityUpdate {
    #[must_use]
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }
}

/// Entity ids of every view derived from one instance name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewIds {
    pub camera: String,
    pub last_camera: String,
    pub triggered: String,
    pub last_source: String,
    pub last_triggered: String,
}

impl ViewIds {
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        let slug = slugify(name);
        Self {
            camera: format!("camera.{slug}"),
            last_camera: format!("camera.{slug}_last"),
            triggered: format!("binary_sensor.{slug}_triggered"),
            last_source: format!("sensor.{slug}_last_source"),
            last_triggered: format!("sensor.{slug}_last_triggered"),
        }
    }
}

/// Lowercase ASCII alphanumerics, every other run collapsed into one `_`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("snapcam");
    }
    slug
}
