use std::io;

use clap::Parser;
use tracing::{debug, info};

use entropy::cli::{self, Cli};

fn main() {
    let args = match Cli::try_parse_from(cli::normalize_args(std::env::args())) {
        Ok(args) => args,
        Err(e) => {
            // help and version go to stdout and are not failures
            let code = if e.use_stderr() { -1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(args.log_level.as_str())
        .with_writer(io::stderr)
        .init();

    info!("entropyc v{}", env!("CARGO_PKG_VERSION"));
    debug!(?args, "arguments");

    let mut stdout = io::stdout().lock();
    if let Err(err) = cli::run(&args, &mut stdout) {
        eprintln!("{}", cli::report(&err));
        std::process::exit(err.exit_code());
    }
}
