//! `{{name}}` placeholder templates.

use crate::{TranspileError, TranspileResult};
use std::collections::BTreeMap;
use std::ops::Range;

/// Opens a placeholder.
pub const MARKER_OPEN: &str = "{{";
/// Closes a placeholder.
pub const MARKER_CLOSE: &str = "}}";

/// Replacement text keyed by placeholder name.
pub type Replacements = BTreeMap<String, String>;

/// A placeholder occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Placeholder name.
    pub name: &'a str,
    /// Byte span of the whole `{{name}}` marker.
    pub span: Range<usize>,
}

fn is_marker_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Every marker in `template`, in order of appearance.
///
/// Braces that do not enclose a word-character name are literal text.
pub fn markers(template: &str) -> Vec<Marker<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = template[pos..].find(MARKER_OPEN) {
        let start = pos + offset;
        let name_start = start + MARKER_OPEN.len();
        let Some(name_len) = template[name_start..].find(MARKER_CLOSE) else {
            break;
        };
        let name = &template[name_start..name_start + name_len];
        if is_marker_name(name) {
            let end = name_start + name_len + MARKER_CLOSE.len();
            found.push(Marker {
                name,
                span: start..end,
            });
            pos = end;
        } else {
            pos = start + 1;
        }
    }
    found
}

/// Placeholder names used by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    markers(template).into_iter().map(|marker| marker.name).collect()
}

/// Check that `replacements` resolves every placeholder of `template`.
///
/// Extra replacements are allowed.
pub fn verify_template(template: &str, replacements: &Replacements) -> TranspileResult<()> {
    let mut missing: Vec<String> = Vec::new();
    for name in placeholders(template) {
        if !replacements.contains_key(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TranspileError::ReplacementsMissingVariable { names: missing })
    }
}

/// Replace every placeholder of `template` with its replacement, verbatim.
///
/// Replacement text is not rescanned, so it may itself contain braces.
pub fn populate_template(template: &str, replacements: &Replacements) -> TranspileResult<String> {
    verify_template(template, replacements)?;

    let mut populated = String::with_capacity(template.len());
    let mut copied = 0;
    for marker in markers(template) {
        populated.push_str(&template[copied..marker.span.start]);
        if let Some(text) = replacements.get(marker.name) {
            populated.push_str(text);
        }
        copied = marker.span.end;
    }
    populated.push_str(&template[copied..]);
    Ok(populated)
}

/// Build a [`Replacements`] map from name/text pairs.
pub fn replacements<K, V, I>(pairs: I) -> Replacements
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(name, text)| (name.into(), text.into()))
        .collect()
}
