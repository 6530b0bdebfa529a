//! CLI error types.

use hardsync_codegen::GenerateError;
use hardsync_contract::ContractError;
use hardsync_transpiler::TranspileError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the `hardsync` command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("failed to load dialect: {0}")]
    Dialect(#[from] TranspileError),

    #[error("output directory {} is not empty; pass --force to overwrite", .0.display())]
    OutputNotEmpty(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = std::result::Result<T, CliError>;
