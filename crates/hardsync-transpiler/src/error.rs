//! Transpiler error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while populating templates or applying rules.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// The template uses placeholders no replacement was supplied for.
    #[error("replacements missing variable(s): {}", .names.join(", "))]
    ReplacementsMissingVariable {
        /// Unresolved placeholder names, in order of first use.
        names: Vec<String>,
    },

    /// A match template uses the same placeholder twice.
    #[error("placeholder `{name}` appears more than once in match template `{template}`")]
    DuplicatePlaceholder {
        /// Placeholder name.
        name: String,
        /// The offending template.
        template: String,
    },

    /// A match template did not compile to a valid pattern.
    #[error("invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A dialect file is not valid YAML for the dialect schema.
    #[error("failed to parse dialect: {0}")]
    Dialect(#[from] serde_yaml::Error),

    /// A dialect file could not be read.
    #[error("failed to read dialect {}: {source}", .path.display())]
    Io {
        /// Path of the dialect file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for transpiler operations.
pub type TranspileResult<T> = Result<T, TranspileError>;
