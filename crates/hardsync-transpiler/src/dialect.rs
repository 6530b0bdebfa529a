//! Target dialects as ordered rule lists.

use crate::{transpile, CompiledRule, RewriteRule, TranspileError, TranspileResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Rewrites generic C++ into the Arduino dialect, in application order.
pub const ARDUINO_RULES: &[(&str, &str)] = &[
    ("#include <string>", "#include <WString.h>"),
    ("std::stoi({{expr}})", "{{expr}}.toInt()"),
    ("std::stod({{expr}})", "{{expr}}.toDouble()"),
    ("std::stof({{expr}})", "{{expr}}.toFloat()"),
    ("std::string", "String"),
    (
        ".substr({{expr1}}, {{expr2}})",
        ".substring({{expr1}}, {{expr1}} + {{expr2}})",
    ),
    (".substr({{expr}})", ".substring({{expr}})"),
    (".find(", ".indexOf("),
];

/// Built-in device targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Arduino-flavoured C++ (`String`, `substring`, `indexOf`).
    #[default]
    Arduino,
    /// Standard C++; no rewriting.
    Cpp,
}

impl Target {
    /// Every built-in target.
    pub const ALL: [Target; 2] = [Target::Arduino, Target::Cpp];

    /// The rule list for this target.
    pub fn dialect(self) -> Dialect {
        match self {
            Target::Arduino => Dialect::new(
                "arduino",
                ARDUINO_RULES
                    .iter()
                    .map(|(pattern, replacement)| RewriteRule::new(*pattern, *replacement)),
            ),
            Target::Cpp => Dialect::new("cpp", std::iter::empty()),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Arduino => write!(f, "arduino"),
            Target::Cpp => write!(f, "cpp"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arduino" => Ok(Target::Arduino),
            "cpp" | "c++" => Ok(Target::Cpp),
            other => Err(format!("unknown target `{}`, expected arduino or cpp", other)),
        }
    }
}

/// A named, ordered list of rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dialect {
    /// Dialect name.
    pub name: String,
    /// Rules, applied in order.
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}

impl Dialect {
    /// Create a dialect.
    pub fn new(name: impl Into<String>, rules: impl IntoIterator<Item = RewriteRule>) -> Self {
        Dialect {
            name: name.into(),
            rules: rules.into_iter().collect(),
        }
    }

    /// Parse a YAML dialect:
    ///
    /// ```yaml
    /// name: arduino
    /// rules:
    ///   - { match: "std::string", replace: "String" }
    /// ```
    pub fn from_yaml_str(yaml: &str) -> TranspileResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML dialect file.
    pub fn from_path(path: impl AsRef<Path>) -> TranspileResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| TranspileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Compile every rule.
    pub fn compile(&self) -> TranspileResult<CompiledDialect> {
        let rules = self
            .rules
            .iter()
            .map(RewriteRule::compile)
            .collect::<TranspileResult<Vec<_>>>()?;
        log::debug!("compiled dialect `{}` with {} rule(s)", self.name, rules.len());
        Ok(CompiledDialect {
            name: self.name.clone(),
            rules,
        })
    }
}

/// A dialect with its rules compiled.
#[derive(Debug, Clone)]
pub struct CompiledDialect {
    name: String,
    rules: Vec<CompiledRule>,
}

impl CompiledDialect {
    /// Dialect name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rewrite `input` into this dialect.
    pub fn transpile(&self, input: &str) -> TranspileResult<String> {
        transpile(&self.rules, input)
    }
}
