use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::{Config, validation::Validate};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Finds and reads the configuration file.
///
/// The default location is optional: when it is missing or broken the
/// defaults are used. A path given explicitly must exist and parse.
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    required: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: Self::default_path(),
            required: false,
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: Some(path.into()),
            required: true,
        }
    }

    /// `<config dir>/entropy/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("entropy").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let Some(path) = self.config_path() else {
            debug!("no config directory on this platform, using defaults");
            return Ok(Config::default());
        };

        if !self.required && !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config = match toml::from_str(&content) {
            Ok(config) => config,
            Err(source) if self.required => {
                return Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                });
            }
            Err(e) => {
                warn!("Failed to parse config {}: {}. Using defaults.", path.display(), e);
                Config::default()
            }
        };

        config.validate();
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
