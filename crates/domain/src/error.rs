//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SnapcamError`] via `#[from]` when crossing a port boundary.

/// Top-level error shared by every crate of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum SnapcamError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A source or host collaborator failed (network, filesystem, bus, …).
    #[error("source error: {0}")]
    Source(Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected while building domain values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("cooldown must be between 0 and {max} minutes, got {actual}")]
    CooldownOutOfRange { actual: f64, max: f64 },

    #[error("unknown source kind {0:?}")]
    UnknownSourceKind(String),

    #[error("unknown trigger type {0:?}")]
    UnknownTriggerType(String),

    #[error("source kind {kind} requires a {field} value")]
    MissingSource {
        kind: &'static str,
        field: &'static str,
    },

    #[error("state trigger requires a watched entity")]
    MissingWatchedEntity,

    #[error("event trigger requires an event type")]
    MissingEventType,

    #[error("configuration schema version {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Lookup of a named resource that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_snapcam_error() {
        let err: SnapcamError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            SnapcamError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Instance",
            id: "garden".to_string(),
        };
        assert_eq!(err.to_string(), "Instance garden not found");
    }

    #[test]
    fn should_display_cooldown_range() {
        let err = ValidationError::CooldownOutOfRange {
            actual: 45.0,
            max: 30.0,
        };
        assert_eq!(
            err.to_string(),
            "cooldown must be between 0 and 30 minutes, got 45"
        );
    }
}
