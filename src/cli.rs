//! The `entropyc` command line: read, parse, translate, build.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Parser;
use tracing::info;

use crate::{
    config::ConfigLoader,
    error::{ArgumentError, EntropyError},
    grammar,
    runtime::MutationRate,
    toolchain::{self, CargoToolchain, HostCompiler, ToolchainError},
    translator::{self, TranslateOptions},
};

const HELP_TEMPLATE: &str = "\
{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}";

fn rate_help() -> String {
    format!(
        "The mutation rate bounds how far a value drifts on each read. It must lie \
         between {} and {} (default {}).\n\
         Slash options are accepted too: /d, /m <RATE>, /c, /h and /?.",
        MutationRate::MIN,
        MutationRate::MAX,
        MutationRate::DEFAULT
    )
}

/// Entropy compiler
#[derive(Parser, Debug)]
#[command(
    name = "entropyc",
    version,
    about = "Compiles Entropy programs, whose values decay every time they are read.",
    help_template = HELP_TEMPLATE,
    after_help = rate_help()
)]
pub struct Cli {
    /// Entropy source file
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Print the syntax tree and stop
    #[arg(short, long)]
    pub debug: bool,

    /// Maximum drift applied by a single read
    #[arg(short, long, value_name = "RATE", allow_hyphen_values = true)]
    pub mutation_rate: Option<String>,

    /// Print the translated program without building it
    #[arg(short = 'c', long)]
    pub no_compile: bool,

    /// Where to write the executable [default: input base name]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `entropy::translator=debug`
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Rewrites the slash options (`/d`, `/m`, `/c`, `/h`, `/?`) to their dash
/// forms. Only exact matches are rewritten, so absolute paths pass through.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    let program = args.next();
    program
        .into_iter()
        .chain(args.map(|arg| {
            match arg.to_ascii_lowercase().as_str() {
                "/d" => "-d".to_string(),
                "/m" => "-m".to_string(),
                "/c" => "-c".to_string(),
                "/h" | "/?" => "-h".to_string(),
                _ => arg,
            }
        }))
        .collect()
}

/// Drops one pair of surrounding quotes, as left by some shells.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

pub fn parse_rate(text: &str) -> Result<MutationRate, ArgumentError> {
    text.parse::<MutationRate>().map_err(ArgumentError::from)
}

/// Runs one invocation, writing the tree dump or the emitted program to `out`.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<(), EntropyError> {
    let input = cli
        .input
        .as_deref()
        .map(strip_quotes)
        .filter(|input| !input.is_empty())
        .ok_or(ArgumentError::MissingInput)?;
    let cli_rate = cli.mutation_rate.as_deref().map(parse_rate).transpose()?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let rate = cli_rate.unwrap_or_else(|| config.rate());

    let path = PathBuf::from(input);
    let source = fs::read_to_string(&path).map_err(|source| EntropyError::Input {
        path: path.clone(),
        source,
    })?;
    info!(input = %path.display(), %rate, "compiling");

    let tree = grammar::parse(&source)?;
    if cli.debug {
        write!(out, "{}", tree.dump())?;
        return Ok(());
    }

    let options = TranslateOptions {
        mutation_rate: rate,
    };
    let emitted = translator::translate(&tree, &options)?;
    out.write_all(emitted.as_bytes())?;
    out.flush()?;

    if cli.no_compile {
        return Ok(());
    }

    let compiler = CargoToolchain::new(&config.toolchain);
    let destination = cli
        .output
        .clone()
        .unwrap_or_else(|| toolchain::default_destination(&path, Path::new(".")));
    compiler.build(&emitted, &toolchain::crate_name(&path), &destination)?;
    Ok(())
}

/// Text written to stderr for a failed invocation.
pub fn report(error: &EntropyError) -> String {
    match error {
        EntropyError::Syntax(e) => e.report(),
        EntropyError::Toolchain(ToolchainError::BuildFailed(diagnostics)) => {
            let mut out = format!("Error: {error}");
            for diagnostic in diagnostics {
                out.push_str(&format!("\n{diagnostic}"));
            }
            out
        }
        _ => format!("Error: {error}"),
    }
}
