//! Where the bytes of a snapshot come from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tag of a [`Source`], as written in configuration records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Entity,
    File,
    Url,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::File => "file",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entity" => Ok(Self::Entity),
            "file" => Ok(Self::File),
            "url" => Ok(Self::Url),
            _ => Err(ValidationError::UnknownSourceKind(s.to_string())),
        }
    }
}

/// An image source. Exactly one reference exists per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Another camera-like entity of the host, by entity id.
    Entity { camera: String },
    /// A local file, already resolved to an absolute path.
    File { path: PathBuf },
    /// An HTTP(S) URL fetched with GET.
    Url { url: String },
}

impl Source {
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Entity { .. } => SourceKind::Entity,
            Self::File { .. } => SourceKind::File,
            Self::Url { .. } => SourceKind::Url,
        }
    }

    /// The camera entity id, for entity sources only.
    #[must_use]
    pub fn camera(&self) -> Option<&str> {
        match self {
            Self::Entity { camera } => Some(camera),
            Self::File { .. } | Self::Url { .. } => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Entity { camera } => camera.clone(),
            Self::File { path } => path.display().to_string(),
            Self::Url { url } => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_kind_ignoring_case_and_whitespace() {
        assert_eq!(" URL ".parse::<SourceKind>().unwrap(), SourceKind::Url);
        assert_eq!("Entity".parse::<SourceKind>().unwrap(), SourceKind::Entity);
    }

    #[test]
    fn should_reject_unknown_kind() {
        let err = "ftp".parse::<SourceKind>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownSourceKind("ftp".to_string()));
    }

    #[test]
    fn should_expose_camera_only_for_entity_sources() {
        let entity = Source::Entity {
            camera: "camera.porch".to_string(),
        };
        let url = Source::Url {
            url: "http://x/y.jpg".to_string(),
        };
        assert_eq!(entity.camera(), Some("camera.porch"));
        assert_eq!(url.camera(), None);
    }

    #[test]
    fn should_label_file_source_with_path() {
        let source = Source::File {
            path: PathBuf::from("/config/www/a.jpg"),
        };
        assert_eq!(source.label(), "/config/www/a.jpg");
        assert_eq!(source.kind(), SourceKind::File);
    }
}
