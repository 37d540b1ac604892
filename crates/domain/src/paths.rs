//! Resolution of configured file references to absolute paths.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Prefix of paths served by the host's local web root.
pub const LOCAL_PREFIX: &str = "/local/";

/// The two directories relative file references resolve against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathRoots {
    /// Base for bare relative paths.
    pub config_dir: PathBuf,
    /// Directory published under [`LOCAL_PREFIX`].
    pub www_dir: PathBuf,
}

impl PathRoots {
    /// Roots where the web directory is `www` inside `config_dir`.
    #[must_use]
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let www_dir = config_dir.join("www");
        Self {
            config_dir,
            www_dir,
        }
    }

    /// Normalize a configured file reference.
    ///
    /// - `/local/<rest>` maps to `<www_dir>/<rest>`
    /// - a relative path resolves under `config_dir`
    /// - an absolute path passes through unchanged
    #[must_use]
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix(LOCAL_PREFIX) {
            return self.www_dir.join(rest);
        }
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

impl Default for PathRoots {
    fn default() -> Self {
        Self::new("/config")
    }
}
