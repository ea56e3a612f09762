use tracing::warn;

use super::{
    Config, ToolchainConfig, default_build_dir, default_cargo, default_mutation_rate,
    default_runtime_path,
};
use crate::runtime::MutationRate;

pub trait Validate {
    fn validate(&mut self);
}

impl Validate for Config {
    fn validate(&mut self) {
        if MutationRate::new(self.mutation_rate).is_err() {
            warn!(
                "Invalid mutation_rate: {}. Using default: {}",
                self.mutation_rate,
                default_mutation_rate()
            );
            self.mutation_rate = default_mutation_rate();
        }

        self.toolchain.validate();
    }
}

impl Validate for ToolchainConfig {
    fn validate(&mut self) {
        if self.cargo.trim().is_empty() {
            warn!("Invalid cargo command: empty string. Using default: cargo");
            self.cargo = default_cargo();
        }

        if self.runtime_path.as_os_str().is_empty() {
            warn!("Invalid runtime_path: empty path. Using the compiler's own crate");
            self.runtime_path = default_runtime_path();
        }

        if self.build_dir.as_os_str().is_empty() {
            warn!("Invalid build_dir: empty path. Using the cache directory");
            self.build_dir = default_build_dir();
        }
    }
}
