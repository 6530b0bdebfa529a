//! Identifier case conversion.

pub use hardsync_contract::to_snake_case;

/// `MeasureVoltage` or `measure_voltage` → `measureVoltage`.
pub fn to_camel_case(name: &str) -> String {
    let snake = to_snake_case(name);
    let mut camel = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' && !camel.is_empty() {
            upper_next = true;
        } else if upper_next {
            camel.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            camel.push(c);
        }
    }
    camel
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// `name` as a Rust identifier, using a raw identifier for keywords.
pub fn rust_ident(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("MeasureVoltage"), "measureVoltage");
        assert_eq!(to_camel_case("measure_voltage"), "measureVoltage");
        assert_eq!(to_camel_case("Ping"), "ping");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("channel"), "channel");
        assert_eq!(rust_ident("type"), "r#type");
    }
}
