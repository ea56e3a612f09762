//! Failures of a compiler invocation and their process exit codes.

use std::{io, path::PathBuf};

use crate::{
    config::ConfigError,
    grammar::SyntaxError,
    runtime::{MutationRate, RuntimeError},
    toolchain::ToolchainError,
    translator::StructuralError,
};

/// Problems with the command line, detected before any source is read.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("No input file given")]
    MissingInput,

    #[error(
        "Mutation rate `{0}` is not a number. It must be a decimal between {min} and {max}",
        min = MutationRate::MIN,
        max = MutationRate::MAX
    )]
    InvalidRate(String),

    #[error(
        "Mutation rate {0} is out of range. It must be a decimal between {min} and {max}",
        min = MutationRate::MIN,
        max = MutationRate::MAX
    )]
    RateOutOfRange(f64),
}

impl From<RuntimeError> for ArgumentError {
    fn from(error: RuntimeError) -> Self {
        match error {
            RuntimeError::InvalidRate(text) => ArgumentError::InvalidRate(text),
            RuntimeError::RateOutOfRange(rate) => ArgumentError::RateOutOfRange(rate),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum EntropyError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Translation failed: {0}")]
    Structure(#[from] StructuralError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl EntropyError {
    /// `1` for a missing input, `-2` for a rate out of range, `-1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            EntropyError::Argument(ArgumentError::MissingInput) => 1,
            EntropyError::Argument(ArgumentError::RateOutOfRange(_)) => -2,
            _ => -1,
        }
    }
}
