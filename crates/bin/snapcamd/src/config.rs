//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `snapcam.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;

use snapcam_domain::config::{ConfigWarning, InstanceConfig, InstanceRecord};
use snapcam_domain::entity::slugify;
use snapcam_domain::error::ValidationError;
use snapcam_domain::paths::PathRoots;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Roots for relative file references.
    pub paths: PathsConfig,
    /// Camera entities served by the in-process host.
    pub cameras: Vec<CameraConfig>,
    /// Snapcam instances, in declaration order.
    pub instances: Vec<InstanceRecord>,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Directories file references resolve against.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub config_dir: PathBuf,
    /// Defaults to `<config_dir>/www`.
    pub www_dir: Option<PathBuf>,
}

/// A camera entity of the in-process host whose image is read from a file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraConfig {
    pub entity_id: String,
    pub file: String,
}

impl Config {
    /// Load configuration from `snapcam.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("snapcam.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SNAPCAM_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SNAPCAM_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("SNAPCAM_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SNAPCAM_CONFIG_DIR") {
            self.paths.config_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("SNAPCAM_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        let mut slugs = HashSet::new();
        for record in &self.instances {
            if !slugs.insert(slugify(&record.name)) {
                return Err(ConfigError::Validation(format!(
                    "instance name {:?} is used more than once",
                    record.name
                )));
            }
        }
        self.instance_configs().map(|_| ())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn path_roots(&self) -> PathRoots {
        let mut roots = PathRoots::new(&self.paths.config_dir);
        if let Some(www_dir) = &self.paths.www_dir {
            roots.www_dir.clone_from(www_dir);
        }
        roots
    }

    /// Validated configuration of every instance, with its warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Instance`] for the first invalid instance.
    pub fn instance_configs(
        &self,
    ) -> Result<Vec<(InstanceConfig, Vec<ConfigWarning>)>, ConfigError> {
        let roots = self.path_roots();
        self.instances
            .iter()
            .map(|record| {
                InstanceConfig::from_record(record, &roots).map_err(|source| {
                    ConfigError::Instance {
                        name: record.name.clone(),
                        source,
                    }
                })
            })
            .collect()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "snapcamd=info,snapcam_app=info,snapcam_adapter_http_reqwest=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/config"),
            www_dir: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// An instance record failed domain validation.
    #[error("invalid instance {name:?}")]
    Instance {
        name: String,
        #[source]
        source: ValidationError,
    },
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use snapcam_domain::pair::{Source, Trigger};

    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.paths.config_dir, PathBuf::from("/config"));
        assert!(config.instances.is_empty());
        assert!(config.cameras.is_empty());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [server]
            host = '127.0.0.1'
            port = 9090

            [logging]
            filter = 'debug'

            [paths]
            config_dir = '/srv/snapcam'

            [[cameras]]
            entity_id = 'camera.driveway'
            file = 'driveway.jpg'

            [[instances]]
            name = 'Front door'
            description = 'Last visitor'
            cooldown_minutes = 2.5
            create_last_camera = true

            [[instances.pairs]]
            camera = 'camera.driveway'
            entity_id = 'binary_sensor.motion'
            from = 'off'

            [[instances.pairs]]
            file = '/local/doorbell.jpg'
            trigger_type = 'event'
            event_type = 'doorbell'
            event_data = { button = 'main' }

            [[instances.pairs]]
            url = 'http://cam.local/snap.jpg'
            trigger_type = 'event'
            event_type = 'my_event'
            event_data = '{"zone": "front"}'
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.cameras[0].entity_id, "camera.driveway");

        let configs = config.instance_configs().unwrap();
        let (instance, warnings) = &configs[0];
        assert!(warnings.is_empty());
        assert_eq!(instance.name, "Front door");
        assert!((instance.cooldown.minutes() - 2.5).abs() < f64::EPSILON);
        assert!(instance.create_last_camera);
        assert_eq!(instance.pairs.len(), 3);
        assert_eq!(
            instance.pairs[1].source,
            Source::File {
                path: PathBuf::from("/srv/snapcam/www/doorbell.jpg")
            }
        );
        let Trigger::State(state) = &instance.pairs[0].trigger else {
            panic!("expected a state trigger");
        };
        assert_eq!(state.to, "on");
        assert_eq!(state.from.as_deref(), Some("off"));
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_valid_port() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_duplicate_instance_names() {
        let toml = "
            [[instances]]
            name = 'Front door'

            [[instances]]
            name = 'front-door'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn should_reject_cooldown_above_maximum() {
        let toml = "
            [[instances]]
            name = 'Front door'
            cooldown_minutes = 45
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Instance {
                source: ValidationError::CooldownOutOfRange { .. },
                ..
            })
        ));
    }

    #[test]
    fn should_report_malformed_event_filter_as_warning() {
        let toml = "
            [[instances]]
            name = 'Front door'

            [[instances.pairs]]
            camera = 'camera.a'
            trigger_type = 'event'
            event_type = 'my_event'
            event_data = '{zone: front'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        let configs = config.instance_configs().unwrap();
        assert_eq!(configs[0].1.len(), 1);
    }

    #[test]
    fn should_derive_www_dir_from_config_dir() {
        let mut config = Config::default();
        config.paths.config_dir = PathBuf::from("/srv/snapcam");
        assert_eq!(config.path_roots().www_dir, Path::new("/srv/snapcam/www"));

        config.paths.www_dir = Some(PathBuf::from("/var/www"));
        assert_eq!(config.path_roots().www_dir, Path::new("/var/www"));
    }

    #[test]
    fn should_format_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn should_format_custom_bind_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9090;
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
