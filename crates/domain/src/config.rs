//! Instance configuration — persisted records and their validated form.
//!
//! Records mirror the persisted schema: flat, loosely-tagged and tolerant of
//! missing fields. [`InstanceConfig::from_record`] turns them into typed
//! [`TriggerPair`]s, normalizing file paths on the way.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cooldown::Cooldown;
use crate::error::ValidationError;
use crate::pair::{
    EventFilter, EventTrigger, Source, SourceKind, StateTrigger, Trigger, TriggerPair, TriggerType,
};
use crate::paths::PathRoots;

/// Schema version written by this release.
pub const SCHEMA_VERSION: u32 = 20;

/// Persisted form of one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_cooldown")]
    pub cooldown_minutes: f64,
    #[serde(default, alias = "create_last")]
    pub create_last_camera: bool,
    #[serde(default)]
    pub pairs: Vec<PairRecord>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

fn default_cooldown() -> f64 {
    Cooldown::DEFAULT_MINUTES
}

/// Persisted form of one trigger pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairRecord {
    pub source_kind: Option<String>,
    pub camera: Option<String>,
    pub file: Option<String>,
    pub url: Option<String>,
    pub trigger_type: Option<String>,
    pub entity_id: Option<String>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub event_type: Option<String>,
    /// Either an object or JSON text encoding one.
    pub event_data: Option<Value>,
}

/// Non-fatal problem found while building an [`InstanceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigWarning {
    /// The event data filter of pair `index` could not be read and was dropped.
    #[error("event data filter of pair {index} dropped, it matches every event of its type: {reason}")]
    MalformedEventFilter { index: usize, reason: String },
}

/// Validated configuration of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceConfig {
    pub name: String,
    pub description: String,
    pub cooldown: Cooldown,
    pub create_last_camera: bool,
    pub pairs: Vec<TriggerPair>,
}

impl InstanceConfig {
    /// Validate a record and build the typed configuration.
    ///
    /// Malformed event filters do not fail the whole configuration; they are
    /// dropped and reported in the returned warnings.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is empty, the cooldown is
    /// out of range, the version is unsupported, or any pair lacks the
    /// fields its tags require.
    pub fn from_record(
        record: &InstanceRecord,
        roots: &PathRoots,
    ) -> Result<(Self, Vec<ConfigWarning>), ValidationError> {
        if record.version > SCHEMA_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: record.version,
                supported: SCHEMA_VERSION,
            });
        }
        let name = record.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let cooldown = Cooldown::from_minutes(record.cooldown_minutes)?;

        let mut warnings = Vec::new();
        let mut pairs = Vec::with_capacity(record.pairs.len());
        for (index, pair) in record.pairs.iter().enumerate() {
            let (pair, warning) = pair.build(index, roots)?;
            warnings.extend(warning);
            pairs.push(pair);
        }

        let config = Self {
            name: name.to_string(),
            description: record.description.clone(),
            cooldown,
            create_last_camera: record.create_last_camera,
            pairs,
        };
        Ok((config, warnings))
    }

    /// First pair whose entity source is `camera`.
    #[must_use]
    pub fn pair_for_camera(&self, camera: &str) -> Option<&TriggerPair> {
        self.pairs
            .iter()
            .find(|pair| pair.source.camera() == Some(camera))
    }
}

impl PairRecord {
    /// Declared kind, or inferred from whichever source field is present.
    fn source_kind(&self) -> Result<SourceKind, ValidationError> {
        if let Some(kind) = non_empty(self.source_kind.as_deref()) {
            return kind.parse();
        }
        if non_empty(self.camera.as_deref()).is_some() {
            Ok(SourceKind::Entity)
        } else if non_empty(self.file.as_deref()).is_some() {
            Ok(SourceKind::File)
        } else if non_empty(self.url.as_deref()).is_some() {
            Ok(SourceKind::Url)
        } else {
            Ok(SourceKind::Entity)
        }
    }

    fn source(&self, roots: &PathRoots) -> Result<Source, ValidationError> {
        match self.source_kind()? {
            SourceKind::Entity => non_empty(self.camera.as_deref())
                .map(|camera| Source::Entity {
                    camera: camera.to_string(),
                })
                .ok_or(ValidationError::MissingSource {
                    kind: "entity",
                    field: "camera",
                }),
            SourceKind::File => non_empty(self.file.as_deref())
                .map(|file| Source::File {
                    path: roots.resolve(file),
                })
                .ok_or(ValidationError::MissingSource {
                    kind: "file",
                    field: "file",
                }),
            SourceKind::Url => non_empty(self.url.as_deref())
                .map(|url| Source::Url {
                    url: url.to_string(),
                })
                .ok_or(ValidationError::MissingSource {
                    kind: "url",
                    field: "url",
                }),
        }
    }

    fn event_filter(&self) -> Result<Option<EventFilter>, String> {
        match &self.event_data {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(Value::Object(map)) => Ok(Some(EventFilter::new(map.clone()))),
            Some(Value::String(text)) => EventFilter::parse(text).map_err(|err| err.to_string()),
            Some(other) => Err(format!("expected an object, got {other}")),
        }
    }

    fn build(
        &self,
        index: usize,
        roots: &PathRoots,
    ) -> Result<(TriggerPair, Option<ConfigWarning>), ValidationError> {
        let source = self.source(roots)?;
        let trigger_type = match non_empty(self.trigger_type.as_deref()) {
            Some(tag) => tag.parse()?,
            None => TriggerType::default(),
        };

        let mut warning = None;
        let trigger = match trigger_type {
            TriggerType::State => {
                let entity_id = non_empty(self.entity_id.as_deref())
                    .ok_or(ValidationError::MissingWatchedEntity)?;
                Trigger::State(StateTrigger {
                    entity_id: entity_id.to_string(),
                    to: non_empty(self.to.as_deref())
                        .unwrap_or(StateTrigger::DEFAULT_TO)
                        .to_string(),
                    from: non_empty(self.from.as_deref()).map(str::to_string),
                })
            }
            TriggerType::Event => {
                let event_type = non_empty(self.event_type.as_deref())
                    .ok_or(ValidationError::MissingEventType)?;
                let filter = self.event_filter().unwrap_or_else(|reason| {
                    warning = Some(ConfigWarning::MalformedEventFilter { index, reason });
                    None
                });
                Trigger::Event(EventTrigger::new(event_type, filter))
            }
        };
        Ok((TriggerPair::new(source, trigger), warning))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
