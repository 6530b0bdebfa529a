//! Exchanges, field-sets, and field values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix appended to an exchange name on the wire for requests.
pub const REQUEST_SUFFIX: &str = "Request";
/// Suffix appended to an exchange name on the wire for responses.
pub const RESPONSE_SUFFIX: &str = "Response";

/// Name of the built-in liveness exchange.
pub const PING_EXCHANGE: &str = "Ping";
/// Name the firmware uses to report protocol errors (`ErrorResponse`).
pub const ERROR_EXCHANGE: &str = "Error";
/// Field of `ErrorResponse` carrying the device's message.
pub const ERROR_MESSAGE_FIELD: &str = "msg";
/// Binary identifier claimed by the built-in `Ping` exchange.
pub const PING_BINARY_ID: u8 = 0x00;

/// Exchange names a contract may not declare.
pub const RESERVED_EXCHANGE_NAMES: &[&str] = &[PING_EXCHANGE, ERROR_EXCHANGE];

// ============================================================================
// Semantic Types
// ============================================================================

/// The abstract type of a field, independent of any target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Floating-point number.
    #[serde(alias = "double")]
    Float,
    /// Signed integer.
    #[serde(alias = "int")]
    Integer,
    /// ASCII text.
    #[serde(alias = "str", alias = "string")]
    Text,
    /// No value.
    None,
}

impl SemanticType {
    /// Every semantic type, in declaration order.
    pub const ALL: [SemanticType; 4] = [
        SemanticType::Float,
        SemanticType::Integer,
        SemanticType::Text,
        SemanticType::None,
    ];
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticType::Float => write!(f, "float"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Text => write!(f, "text"),
            SemanticType::None => write!(f, "none"),
        }
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// A typed field value carried by an exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Floating-point value.
    Float(f64),
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// The single value of the `none` type.
    None,
}

impl FieldValue {
    /// The semantic type of this value.
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            FieldValue::Float(_) => SemanticType::Float,
            FieldValue::Integer(_) => SemanticType::Integer,
            FieldValue::Text(_) => SemanticType::Text,
            FieldValue::None => SemanticType::None,
        }
    }

    /// Get the value as f64, if it is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as i64, if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// Field values keyed by field name.
pub type FieldValues = BTreeMap<String, FieldValue>;

// ============================================================================
// Fields and Field-sets
// ============================================================================

/// A named, typed field of a request or response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Field {
    /// Field name, used as the wire key and as the generated parameter name.
    pub name: String,
    /// Semantic type of the field.
    #[serde(rename = "type")]
    pub ty: SemanticType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// An ordered list of fields. Order is the wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(Vec<Field>);

impl FieldSet {
    /// Create an empty field-set.
    pub fn new() -> Self {
        FieldSet(Vec::new())
    }

    /// Append a field.
    pub fn with(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.0.push(Field::new(name, ty));
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|field| field.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the field-set has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the fields.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }
}

impl From<Vec<Field>> for FieldSet {
    fn from(fields: Vec<Field>) -> Self {
        FieldSet(fields)
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Exchanges
// ============================================================================

/// A named request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    name: String,
    binary_id: Option<Vec<u8>>,
    request: FieldSet,
    response: FieldSet,
}

impl Exchange {
    /// Create an exchange with a text identifier only.
    pub fn new(name: impl Into<String>, request: FieldSet, response: FieldSet) -> Self {
        Exchange {
            name: name.into(),
            binary_id: None,
            request,
            response,
        }
    }

    /// Attach a binary identifier.
    pub fn with_binary_id(mut self, id: impl Into<Vec<u8>>) -> Self {
        self.binary_id = Some(id.into());
        self
    }

    /// The built-in `Ping` exchange: no fields either way.
    pub fn ping() -> Self {
        Exchange::new(PING_EXCHANGE, FieldSet::new(), FieldSet::new())
            .with_binary_id(vec![PING_BINARY_ID])
    }

    /// The built-in `Error` exchange. Devices send `ErrorResponse(msg=...)`
    /// for requests they cannot parse or dispatch.
    pub fn error() -> Self {
        Exchange::new(
            ERROR_EXCHANGE,
            FieldSet::new(),
            FieldSet::new().with(ERROR_MESSAGE_FIELD, SemanticType::Text),
        )
    }

    /// Exchange name, also the text-encoding identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary-encoding identifier, if one was declared.
    pub fn binary_id(&self) -> Option<&[u8]> {
        self.binary_id.as_deref()
    }

    /// Request field-set.
    pub fn request(&self) -> &FieldSet {
        &self.request
    }

    /// Response field-set.
    pub fn response(&self) -> &FieldSet {
        &self.response
    }

    /// Request or response field-set.
    pub fn fields(&self, is_request: bool) -> &FieldSet {
        if is_request {
            &self.request
        } else {
            &self.response
        }
    }

    /// Wire message name, e.g. `MeasureVoltageRequest`.
    pub fn message_name(&self, is_request: bool) -> String {
        let suffix = if is_request {
            REQUEST_SUFFIX
        } else {
            RESPONSE_SUFFIX
        };
        format!("{}{}", self.name, suffix)
    }

    /// Every semantic type used by any field, in first-use order.
    pub fn semantic_types(&self) -> Vec<SemanticType> {
        let mut types = Vec::new();
        for field in self.request.iter().chain(self.response.iter()) {
            if !types.contains(&field.ty) {
                types.push(field.ty);
            }
        }
        types
    }
}

/// Split a wire message name into exchange name and direction.
///
/// Returns `Some((name, is_request))` for `XRequest` / `XResponse`.
pub fn split_message_name(message: &str) -> Option<(&str, bool)> {
    if let Some(name) = message.strip_suffix(REQUEST_SUFFIX) {
        Some((name, true))
    } else {
        message
            .strip_suffix(RESPONSE_SUFFIX)
            .map(|name| (name, false))
    }
}

/// Whether `name` is usable as an identifier in every generated language.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `MeasureVoltage` → `measure_voltage`.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or a digit; runs of capitals stay together. Generated
/// method names derive from this form, so two exchanges with the same
/// snake-case name cannot coexist.
pub fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase()
            && previous.map_or(false, |p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            snake.push('_');
        }
        snake.push(c.to_ascii_lowercase());
        previous = Some(c);
    }
    snake
}

const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

/// Rust words that cannot be written as raw identifiers.
const RUST_UNRAWABLE: &[&str] = &["_", "self", "Self", "super", "crate"];

/// Locals declared by every generated firmware wrapper.
const WRAPPER_LOCALS: &[&str] = &["parsed", "result_"];

/// Whether a field called `name` would clash with a keyword or a local in
/// the generated firmware or host client.
pub fn is_reserved_field_name(name: &str) -> bool {
    [CPP_KEYWORDS, RUST_UNRAWABLE, WRAPPER_LOCALS]
        .iter()
        .any(|words| words.contains(&name))
}

/// Whether an exchange called `name` would clash with a built-in exchange
/// or generate a firmware method named after a C++ keyword.
pub fn is_reserved_exchange_name(name: &str) -> bool {
    let snake = to_snake_case(name);
    RESERVED_EXCHANGE_NAMES
        .iter()
        .any(|builtin| to_snake_case(builtin) == snake)
        || CPP_KEYWORDS.contains(&snake.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_name() {
        let ex = Exchange::new("MeasureVoltage", FieldSet::new(), FieldSet::new());
        assert_eq!(ex.message_name(true), "MeasureVoltageRequest");
        assert_eq!(ex.message_name(false), "MeasureVoltageResponse");
    }

    #[test]
    fn test_split_message_name() {
        assert_eq!(split_message_name("PingRequest"), Some(("Ping", true)));
        assert_eq!(split_message_name("PingResponse"), Some(("Ping", false)));
        assert_eq!(split_message_name("Ping"), None);
    }

    #[test]
    fn test_semantic_types_deduplicated() {
        let ex = Exchange::new(
            "MeasureVoltage",
            FieldSet::new()
                .with("channel", SemanticType::Integer)
                .with("integration_time", SemanticType::Float),
            FieldSet::new().with("voltage", SemanticType::Float),
        );
        assert_eq!(
            ex.semantic_types(),
            vec![SemanticType::Integer, SemanticType::Float]
        );
    }

    #[test]
    fn test_semantic_types_none() {
        assert!(Exchange::ping().semantic_types().is_empty());
    }

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("integration_time"));
        assert!(is_valid_identifier("MeasureVoltage"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("has space"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("MeasureVoltage"), "measure_voltage");
        assert_eq!(to_snake_case("measure_voltage"), "measure_voltage");
        assert_eq!(to_snake_case("Read2Channels"), "read2_channels");
        assert_eq!(to_snake_case("ADC"), "adc");
    }

    #[test]
    fn test_reserved_field_names() {
        for name in ["self", "Self", "super", "crate", "_", "int", "class", "parsed", "result_"] {
            assert!(is_reserved_field_name(name), "{} should be reserved", name);
        }
        for name in ["channel", "result", "type", "voltage", "Int"] {
            assert!(!is_reserved_field_name(name), "{} should be allowed", name);
        }
    }

    #[test]
    fn test_reserved_exchange_names() {
        assert!(is_reserved_exchange_name("Ping"));
        assert!(is_reserved_exchange_name("ping"));
        assert!(is_reserved_exchange_name("ERROR"));
        assert!(is_reserved_exchange_name("Delete"));
        assert!(!is_reserved_exchange_name("MeasureVoltage"));
        assert!(!is_reserved_exchange_name("PingAll"));
    }

    #[test]
    fn test_semantic_type_aliases() {
        let ty: SemanticType = serde_yaml::from_str("int").unwrap();
        assert_eq!(ty, SemanticType::Integer);
        let ty: SemanticType = serde_yaml::from_str("string").unwrap();
        assert_eq!(ty, SemanticType::Text);
    }
}
