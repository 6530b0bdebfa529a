//! Pattern-based rewrite rules.
//!
//! A rule pairs a match template with a replacement template. Literal text in
//! the match template is matched verbatim; each `{{name}}` captures a single
//! expression (word characters, arithmetic operators, parentheses, spaces).
//! Each match is replaced by the populated replacement template.

use crate::template::{markers, placeholders, populate_template, Replacements};
use crate::{TranspileError, TranspileResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters a placeholder may capture.
pub const EXPRESSION_CLASS: &str = r"[\w+\-*/() ]+";

/// A declarative rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    /// Match template.
    #[serde(rename = "match")]
    pub pattern: String,
    /// Replacement template.
    #[serde(rename = "replace")]
    pub replacement: String,
}

impl RewriteRule {
    /// Create a rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        RewriteRule {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Compile the match template into a matcher.
    ///
    /// Fails if a placeholder repeats in the match template or if the
    /// replacement uses a placeholder the match template does not capture.
    pub fn compile(&self) -> TranspileResult<CompiledRule> {
        let mut source = String::new();
        let mut names: Vec<&str> = Vec::new();
        let mut copied = 0;
        for marker in markers(&self.pattern) {
            if names.contains(&marker.name) {
                return Err(TranspileError::DuplicatePlaceholder {
                    name: marker.name.to_string(),
                    template: self.pattern.clone(),
                });
            }
            source.push_str(&regex::escape(&self.pattern[copied..marker.span.start]));
            source.push_str(&format!("(?P<{}>{})", marker.name, EXPRESSION_CLASS));
            names.push(marker.name);
            copied = marker.span.end;
        }
        source.push_str(&regex::escape(&self.pattern[copied..]));

        let mut uncaptured: Vec<String> = Vec::new();
        for name in placeholders(&self.replacement) {
            if !names.contains(&name) && !uncaptured.iter().any(|n| n == name) {
                uncaptured.push(name.to_string());
            }
        }
        if !uncaptured.is_empty() {
            return Err(TranspileError::ReplacementsMissingVariable { names: uncaptured });
        }

        log::trace!("compiled rule `{}` as /{}/", self.pattern, source);
        Ok(CompiledRule {
            regex: Regex::new(&source)?,
            names: names.into_iter().map(str::to_string).collect(),
            rule: self.clone(),
        })
    }
}

/// A rule ready to apply.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: RewriteRule,
    regex: Regex,
    names: Vec<String>,
}

impl CompiledRule {
    /// The source rule.
    pub fn rule(&self) -> &RewriteRule {
        &self.rule
    }

    /// Rewrite every match in `input`.
    ///
    /// Splices are applied rightmost first so earlier match offsets stay
    /// valid. A rule that matches nothing returns the input unchanged.
    pub fn apply(&self, input: &str) -> TranspileResult<String> {
        let mut splices = Vec::new();
        for captures in self.regex.captures_iter(input) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let mut values = Replacements::new();
            for name in &self.names {
                if let Some(capture) = captures.name(name) {
                    values.insert(name.clone(), capture.as_str().to_string());
                }
            }
            let text = populate_template(&self.rule.replacement, &values)?;
            splices.push((whole.range(), text));
        }

        if !splices.is_empty() {
            log::trace!("rule `{}` matched {} time(s)", self.rule.pattern, splices.len());
        }

        let mut output = input.to_string();
        for (range, text) in splices.into_iter().rev() {
            output.replace_range(range, &text);
        }
        Ok(output)
    }
}

/// Apply `rules` in order, each exhaustively before the next.
pub fn transpile(rules: &[CompiledRule], input: &str) -> TranspileResult<String> {
    let mut text = input.to_string();
    for rule in rules {
        text = rule.apply(&text)?;
    }
    Ok(text)
}

/// Compile and apply a single rule.
pub fn transpile_template(pattern: &str, replacement: &str, input: &str) -> TranspileResult<String> {
    RewriteRule::new(pattern, replacement).compile()?.apply(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rule() {
        assert_eq!(
            transpile_template("variable", "swag", "variable 1400").unwrap(),
            "swag 1400"
        );
    }

    #[test]
    fn test_single_placeholder() {
        assert_eq!(
            transpile_template("variable {{val}}", "{{val}} variable", "variable 1400").unwrap(),
            "1400 variable"
        );
    }

    #[test]
    fn test_two_placeholders() {
        assert_eq!(
            transpile_template(
                "variable {{val1}} {{val2}}",
                "{{val1}} variable {{val2}}",
                "variable 1400 1900"
            )
            .unwrap(),
            "1400 variable 1900"
        );
    }

    #[test]
    fn test_swap_function_arguments() {
        assert_eq!(
            transpile_template("myFunc({{val1}}, {{val2}})", "myFunc({{val2}}, {{val1}})", "myFunc(1400, 1900)")
                .unwrap(),
            "myFunc(1900, 1400)"
        );
    }

    #[test]
    fn test_special_characters_are_literal() {
        assert_eq!(
            transpile_template("#import <string>", "#import <WString.h>", "#import <string>").unwrap(),
            "#import <WString.h>"
        );
        assert_eq!(
            transpile_template("a.b", "c", "axb a.b").unwrap(),
            "axb c"
        );
    }

    #[test]
    fn test_every_match_rewritten() {
        let input = "f(a, b); x = 1; f(c, d);";
        assert_eq!(
            transpile_template("f({{x}}, {{y}})", "g({{y}}, {{x}})", input).unwrap(),
            "g(b, a); x = 1; g(d, c);"
        );
    }

    #[test]
    fn test_capture_stops_at_statement_boundary() {
        let input = "s.substr(i, 2); t.substr(j, 3);";
        assert_eq!(
            transpile_template(".substr({{a}}, {{b}})", ".substring({{a}}, {{a}} + {{b}})", input)
                .unwrap(),
            "s.substring(i, i + 2); t.substring(j, j + 3);"
        );
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        assert_eq!(
            transpile_template("absent({{x}})", "{{x}}", "present(1)").unwrap(),
            "present(1)"
        );
    }

    #[test]
    fn test_duplicate_placeholder_rejected() {
        assert!(matches!(
            RewriteRule::new("f({{x}}, {{x}})", "{{x}}").compile(),
            Err(TranspileError::DuplicatePlaceholder { name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_uncaptured_replacement_rejected() {
        assert!(matches!(
            RewriteRule::new("f({{x}})", "{{x}} + {{y}}").compile(),
            Err(TranspileError::ReplacementsMissingVariable { names }) if names == vec!["y".to_string()]
        ));
    }

    #[test]
    fn test_transpile_in_order() {
        let rules = [
            RewriteRule::new("a", "b").compile().unwrap(),
            RewriteRule::new("b", "c").compile().unwrap(),
        ];
        assert_eq!(transpile(&rules, "a b").unwrap(), "c c");
        assert_eq!(transpile(&rules[1..], "a b").unwrap(), "a c");
    }

    #[test]
    fn test_empty_rule_list_is_identity() {
        let input = "#include <string>\nstd::string s = t.substr(0, 1);\n";
        assert_eq!(transpile(&[], input).unwrap(), input);
    }
}
