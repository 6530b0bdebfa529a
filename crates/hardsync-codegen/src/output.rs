//! Generated artifacts.

use crate::{GenerateError, GenerateResult};
use hardsync_transpiler::{populate_template, CompiledDialect, Replacements};
use std::path::{Path, PathBuf};

/// Directory holding the device-firmware bundle.
pub const FIRMWARE_DIR: &str = "firmware";
/// Name of the generated host client.
pub const HOST_CLIENT_FILE: &str = "client.rs";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

impl GeneratedFile {
    /// Create a generated file.
    pub fn new(path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        GeneratedFile {
            path: path.as_ref().to_path_buf(),
            contents: contents.into(),
        }
    }

    /// File name without directories.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// Populate `template` and, if a dialect is given, rewrite the result.
pub(crate) fn render(
    name: &str,
    template: &str,
    replacements: &Replacements,
    dialect: Option<&CompiledDialect>,
) -> GenerateResult<String> {
    let wrap = |source| GenerateError::Template {
        template: name.to_string(),
        source,
    };
    let populated = populate_template(template, replacements).map_err(wrap)?;
    let rendered = match dialect {
        Some(dialect) => dialect.transpile(&populated).map_err(wrap)?,
        None => populated,
    };
    log::debug!("rendered {} ({} bytes)", name, rendered.len());
    Ok(rendered)
}
