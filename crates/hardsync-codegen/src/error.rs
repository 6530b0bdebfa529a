//! Generator error types.

use hardsync_contract::{ContractError, SemanticType};
use hardsync_transpiler::TranspileError;
use thiserror::Error;

/// Errors that can occur while generating sources.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The contract is invalid.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A template could not be populated or transpiled.
    #[error("template `{template}`: {source}")]
    Template {
        /// Name of the template being generated.
        template: String,
        /// Underlying transpiler error.
        #[source]
        source: TranspileError,
    },

    /// The dialect failed to compile.
    #[error(transparent)]
    Dialect(#[from] TranspileError),

    /// The type mapping has no entry for a type in use.
    #[error("type mapping has no entry for `{0}`")]
    UnmappedType(SemanticType),
}

/// Result type alias for generator operations.
pub type GenerateResult<T> = Result<T, GenerateError>;
