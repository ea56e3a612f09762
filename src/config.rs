//! Compiler settings read from `config.toml`.
//!
//! Every key is optional. Missing keys take their defaults and invalid values
//! are replaced by defaults with a warning, so a partial or stale file never
//! stops a build. Command-line flags override whatever the file says.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::runtime::MutationRate;

mod loader;
mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use validation::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

impl Config {
    /// The configured rate, or the default one if the value is out of range.
    pub fn rate(&self) -> MutationRate {
        MutationRate::new(self.mutation_rate).unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

/// How emitted programs are built into executables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToolchainConfig {
    /// Cargo executable.
    #[serde(default = "default_cargo")]
    pub cargo: String,

    /// Directory of the `entropy` crate emitted programs link against.
    #[serde(default = "default_runtime_path")]
    pub runtime_path: PathBuf,

    /// Where the throwaway build projects live.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    #[serde(default = "default_release")]
    pub release: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            cargo: default_cargo(),
            runtime_path: default_runtime_path(),
            build_dir: default_build_dir(),
            release: default_release(),
        }
    }
}

pub(crate) fn default_mutation_rate() -> f64 {
    MutationRate::DEFAULT.get()
}

pub(crate) fn default_cargo() -> String {
    "cargo".to_string()
}

pub(crate) fn default_runtime_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub(crate) fn default_build_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("entropy")
        .join("builds")
}

fn default_release() -> bool {
    true
}
