//! `hardsync` command-line front end.
//!
//! Loads and validates a contract, then either reports on it (`check`) or
//! writes the device firmware bundle and host client (`generate`).

mod error;

pub use error::*;

use clap::{Parser, Subcommand};
use hardsync_codegen::generate;
use hardsync_contract::Contract;
use hardsync_transpiler::{Dialect, Target};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hardsync",
    version,
    about = "Generate matching device firmware and host clients from an interface contract"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate firmware and host client sources from a contract.
    Generate {
        /// Contract file (YAML, or JSON with a `.json` extension).
        contract: PathBuf,

        /// Directory to write into.
        #[arg(short, long, default_value = "generated")]
        output_dir: PathBuf,

        /// Device dialect: arduino or cpp.
        #[arg(short, long, default_value_t = Target::Arduino)]
        target: Target,

        /// YAML rewrite-rule file used instead of the built-in target.
        #[arg(long, conflicts_with = "target")]
        dialect: Option<PathBuf>,

        /// Overwrite files in a non-empty output directory.
        #[arg(short, long)]
        force: bool,
    },
    /// Load and validate a contract, then print a summary.
    Check {
        /// Contract file (YAML, or JSON with a `.json` extension).
        contract: PathBuf,
    },
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run one command. Returns what should be printed to stdout.
pub fn run(cli: &Cli) -> CliResult<String> {
    match &cli.command {
        Command::Generate {
            contract,
            output_dir,
            target,
            dialect,
            force,
        } => {
            let dialect = match dialect {
                Some(path) => Dialect::from_path(path)?,
                None => target.dialect(),
            };
            let written = generate_into(contract, output_dir, &dialect, *force)?;
            let mut out = String::new();
            for path in written {
                let _ = writeln!(out, "{}", path.display());
            }
            Ok(out)
        }
        Command::Check { contract } => check(contract),
    }
}

/// Load, validate, and summarize a contract.
pub fn check(path: &Path) -> CliResult<String> {
    let contract = Contract::from_path(path)?;
    info!("{} is valid", path.display());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} exchange(s), {} encoding, {} baud",
        path.display(),
        contract.exchanges().len(),
        contract.encoding(),
        contract.channel().baud_rate().get()
    );
    for exchange in contract.exchanges() {
        let _ = writeln!(
            out,
            "  {} ({} request field(s), {} response field(s))",
            exchange.name(),
            exchange.request().len(),
            exchange.response().len()
        );
    }
    Ok(out)
}

fn is_non_empty_dir(dir: &Path) -> CliResult<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CliError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Generate sources for the contract at `contract` and write them under
/// `output_dir`. Returns the written paths.
///
/// Nothing is written unless generation succeeds for every file.
pub fn generate_into(
    contract: &Path,
    output_dir: &Path,
    dialect: &Dialect,
    force: bool,
) -> CliResult<Vec<PathBuf>> {
    let contract = Contract::from_path(contract)?;
    let files = generate(&contract, dialect)?;

    if is_non_empty_dir(output_dir)? {
        if !force {
            return Err(CliError::OutputNotEmpty(output_dir.to_path_buf()));
        }
        warn!("overwriting files in {}", output_dir.display());
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = output_dir.join(&file.path);
        let io = |source| CliError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        std::fs::write(&path, &file.contents).map_err(io)?;
        debug!("wrote {} ({} bytes)", path.display(), file.contents.len());
        written.push(path);
    }
    info!(
        "generated {} file(s) in {}",
        written.len(),
        output_dir.display()
    );
    Ok(written)
}
