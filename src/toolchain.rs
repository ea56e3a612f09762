//! Builds emitted programs into executables with the host Rust toolchain.
//!
//! [`CargoToolchain`] writes a throwaway cargo project around the emitted
//! source (one per crate name, reused between builds so dependencies stay
//! compiled), runs `cargo build --message-format=json` on it, turns the
//! compiler messages into [`HostDiagnostic`]s and copies the binary out.

use std::{
    collections::BTreeMap,
    env::consts::EXE_SUFFIX,
    fmt, fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::ToolchainConfig;

/// One error reported by the host compiler, positioned in the emitted source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDiagnostic {
    pub line: usize,
    pub column: usize,
    pub code: String,
    pub message: String,
}

impl fmt::Display for HostDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}, Column {}: ", self.line, self.column)?;
        if self.code.is_empty() {
            write!(f, "error: {}", self.message)
        } else {
            write!(f, "error {}: {}", self.code, self.message)
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ToolchainError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Host build failed with {} error(s)", .0.len())]
    BuildFailed(Vec<HostDiagnostic>),

    #[error("Build succeeded but no executable was found at {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Unusable path {}: the build project needs UTF-8 paths", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Failed to write the build manifest: {0}")]
    Manifest(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A compiler able to turn emitted source into an executable.
pub trait HostCompiler: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Builds `source` as the crate `crate_name` and places the executable at
    /// `destination`, which is returned on success.
    fn build(
        &self,
        source: &str,
        crate_name: &str,
        destination: &Path,
    ) -> Result<PathBuf, ToolchainError>;
}

// ============================================================================
// Cargo
// ============================================================================

#[derive(Debug, Clone)]
pub struct CargoToolchain {
    pub cargo: String,
    pub runtime_path: PathBuf,
    pub build_dir: PathBuf,
    pub release: bool,
}

impl CargoToolchain {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            cargo: config.cargo.clone(),
            runtime_path: config.runtime_path.clone(),
            build_dir: config.build_dir.clone(),
            release: config.release,
        }
    }

    pub fn project_dir(&self, crate_name: &str) -> PathBuf {
        self.build_dir.join(crate_name)
    }

    /// Writes `Cargo.toml` and `src/main.rs`, returning the project directory.
    pub fn write_project(&self, source: &str, crate_name: &str) -> Result<PathBuf, ToolchainError> {
        let project = self.project_dir(crate_name);
        fs::create_dir_all(project.join("src"))?;
        fs::write(project.join("Cargo.toml"), self.manifest(crate_name)?)?;
        fs::write(project.join("src").join("main.rs"), source)?;
        debug!(project = %project.display(), "build project written");
        Ok(project)
    }

    pub fn manifest(&self, crate_name: &str) -> Result<String, ToolchainError> {
        let runtime_path = self
            .runtime_path
            .to_str()
            .ok_or_else(|| ToolchainError::NonUtf8Path(self.runtime_path.clone()))?;
        let manifest = Manifest {
            package: Package {
                name: crate_name,
                version: "0.1.0",
                edition: "2021",
            },
            dependencies: BTreeMap::from([(
                "entropy",
                PathDependency { path: runtime_path },
            )]),
            workspace: Workspace {},
        };
        Ok(toml::to_string(&manifest)?)
    }

    pub fn artifact(&self, project: &Path, crate_name: &str) -> PathBuf {
        let profile = if self.release { "release" } else { "debug" };
        project
            .join("target")
            .join(profile)
            .join(format!("{crate_name}{EXE_SUFFIX}"))
    }
}

impl HostCompiler for CargoToolchain {
    fn name(&self) -> &str {
        &self.cargo
    }

    fn build(
        &self,
        source: &str,
        crate_name: &str,
        destination: &Path,
    ) -> Result<PathBuf, ToolchainError> {
        let project = self.write_project(source, crate_name)?;

        let mut command = Command::new(&self.cargo);
        command
            .arg("build")
            .arg("--message-format=json")
            .arg("--manifest-path")
            .arg(project.join("Cargo.toml"))
            .env("CARGO_TARGET_DIR", project.join("target"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.release {
            command.arg("--release");
        }

        info!(
            compiler = self.name(),
            crate_name,
            release = self.release,
            "running host build"
        );
        let output = command.output().map_err(|source| ToolchainError::Spawn {
            command: self.cargo.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics = parse_diagnostics(&stdout);
        if !output.status.success() {
            let diagnostics = if diagnostics.is_empty() {
                vec![fallback_diagnostic(&String::from_utf8_lossy(&output.stderr))]
            } else {
                diagnostics
            };
            // reported to the user by the caller
            for diagnostic in &diagnostics {
                debug!("{diagnostic}");
            }
            return Err(ToolchainError::BuildFailed(diagnostics));
        }

        let artifact = self.artifact(&project, crate_name);
        if !artifact.is_file() {
            return Err(ToolchainError::MissingArtifact(artifact));
        }
        fs::copy(&artifact, destination)?;
        info!(executable = %destination.display(), "host build finished");
        Ok(destination.to_path_buf())
    }
}

// ============================================================================
// Manifest
// ============================================================================

#[derive(Serialize)]
struct Manifest<'a> {
    package: Package<'a>,
    dependencies: BTreeMap<&'a str, PathDependency<'a>>,
    workspace: Workspace,
}

#[derive(Serialize)]
struct Package<'a> {
    name: &'a str,
    version: &'a str,
    edition: &'a str,
}

#[derive(Serialize)]
struct PathDependency<'a> {
    path: &'a str,
}

/// An empty `[workspace]` keeps the project out of any enclosing workspace.
#[derive(Serialize)]
struct Workspace {}

// ============================================================================
// Naming
// ============================================================================

/// A cargo package name derived from the input file's base name.
pub fn crate_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "entropy_");
    }
    name
}

/// `<input base name><platform executable suffix>` next to `dir`.
pub fn default_destination(input: &Path, dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "a".to_string());
    dir.join(format!("{stem}{EXE_SUFFIX}"))
}

// ============================================================================
// Cargo messages
// ============================================================================

#[derive(Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    message: Option<CompilerMessage>,
}

#[derive(Deserialize)]
struct CompilerMessage {
    message: String,
    level: String,
    #[serde(default)]
    code: Option<DiagnosticCode>,
    #[serde(default)]
    spans: Vec<DiagnosticSpan>,
}

#[derive(Deserialize)]
struct DiagnosticCode {
    code: String,
}

#[derive(Deserialize)]
struct DiagnosticSpan {
    line_start: usize,
    column_start: usize,
    #[serde(default)]
    is_primary: bool,
}

/// Extracts the errors from cargo's `--message-format=json` output.
///
/// Warnings, artifact notices and lines that are not JSON are skipped.
pub fn parse_diagnostics(stdout: &str) -> Vec<HostDiagnostic> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| match serde_json::from_str::<CargoMessage>(line) {
            Ok(message) => Some(message),
            Err(e) => {
                trace!("skipping cargo output line: {e}");
                None
            }
        })
        .filter(|message| message.reason == "compiler-message")
        .filter_map(|message| message.message)
        .filter(|message| message.level.starts_with("error"))
        .map(|message| {
            let span = message
                .spans
                .iter()
                .find(|span| span.is_primary)
                .or(message.spans.first());
            HostDiagnostic {
                line: span.map_or(0, |s| s.line_start),
                column: span.map_or(0, |s| s.column_start),
                code: message.code.map(|c| c.code).unwrap_or_default(),
                message: message.message,
            }
        })
        .collect()
}

/// Cargo failed without a compiler message: dependency resolution, a
/// missing toolchain and the like. Its last stderr line says why.
fn fallback_diagnostic(stderr: &str) -> HostDiagnostic {
    let message = stderr
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .unwrap_or("cargo build failed")
        .to_string();
    HostDiagnostic {
        line: 0,
        column: 0,
        code: String::new(),
        message,
    }
}
