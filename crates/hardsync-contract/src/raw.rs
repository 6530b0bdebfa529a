//! Raw contract declarations.
//!
//! A [`RawContract`] is the neutral intermediate form of a contract exactly as
//! the author wrote it: exchanges may lack a field-set and the encoding,
//! channel, and type mapping may be absent. Nothing here is validated; see
//! [`Contract::load`](crate::Contract::load).

use crate::{
    ContractError, ContractResult, EncodingKind, FieldSet, RawChannel, SemanticType, TypeMapping,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An exchange declaration as written in a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawExchange {
    /// Exchange name.
    pub name: String,
    /// Identifier bytes for the binary encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_id: Option<Vec<u8>>,
    /// Request field-set, if declared.
    #[serde(default)]
    pub request: Option<FieldSet>,
    /// Response field-set, if declared.
    #[serde(default)]
    pub response: Option<FieldSet>,
}

impl RawExchange {
    /// Start a declaration with neither field-set present.
    pub fn new(name: impl Into<String>) -> Self {
        RawExchange {
            name: name.into(),
            binary_id: None,
            request: None,
            response: None,
        }
    }

    /// Declare the request field-set.
    pub fn request(mut self, fields: FieldSet) -> Self {
        self.request = Some(fields);
        self
    }

    /// Declare the response field-set.
    pub fn response(mut self, fields: FieldSet) -> Self {
        self.response = Some(fields);
        self
    }

    /// Append a field to the request, declaring it if needed.
    pub fn request_field(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.request = Some(self.request.take().unwrap_or_default().with(name, ty));
        self
    }

    /// Append a field to the response, declaring it if needed.
    pub fn response_field(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.response = Some(self.response.take().unwrap_or_default().with(name, ty));
        self
    }

    /// Attach a binary identifier.
    pub fn binary_id(mut self, id: impl Into<Vec<u8>>) -> Self {
        self.binary_id = Some(id.into());
        self
    }
}

/// A contract as written by its author, before defaults and validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawContract {
    /// Declared exchanges, in declaration order.
    #[serde(default)]
    pub exchanges: Vec<RawExchange>,
    /// Selected wire encoding.
    #[serde(default)]
    pub encoding: Option<EncodingKind>,
    /// Channel declaration.
    #[serde(default)]
    pub channel: Option<RawChannel>,
    /// Type mapping for generated device code.
    #[serde(default)]
    pub type_mapping: Option<TypeMapping>,
}

impl RawContract {
    /// Create an empty contract.
    pub fn new() -> Self {
        RawContract::default()
    }

    /// Register an exchange.
    pub fn exchange(mut self, exchange: RawExchange) -> Self {
        self.exchanges.push(exchange);
        self
    }

    /// Select the wire encoding.
    pub fn encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Declare the channel.
    pub fn channel(mut self, channel: RawChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Declare the type mapping.
    pub fn type_mapping(mut self, mapping: TypeMapping) -> Self {
        self.type_mapping = Some(mapping);
        self
    }

    /// Parse a YAML contract.
    pub fn from_yaml_str(yaml: &str) -> ContractResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a JSON contract.
    pub fn from_json_str(json: &str) -> ContractResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a contract file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> ContractResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASURE_VOLTAGE_YAML: &str = r#"
channel:
  baud_rate: 115200
  identifier: A50285BI
exchanges:
  - name: MeasureVoltage
    request:
      - { name: integration_time, type: float }
      - { name: channel, type: integer }
    response:
      - { name: voltage, type: float }
  - name: Identify
    request: []
    response:
      - { name: response, type: text }
"#;

    #[test]
    fn test_parse_yaml() {
        let raw = RawContract::from_yaml_str(MEASURE_VOLTAGE_YAML).unwrap();
        assert_eq!(raw.exchanges.len(), 2);
        assert!(raw.encoding.is_none());
        assert!(raw.type_mapping.is_none());
        assert_eq!(raw.channel, Some(RawChannel::new(115_200, "A50285BI")));

        let measure = &raw.exchanges[0];
        let request = measure.request.as_ref().unwrap();
        assert_eq!(request.fields()[0].name, "integration_time");
        assert_eq!(request.fields()[1].ty, SemanticType::Integer);

        let identify = &raw.exchanges[1];
        assert!(identify.request.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_parse_yaml_missing_response() {
        let yaml = "exchanges:\n  - name: Lonely\n    request: []\n";
        let raw = RawContract::from_yaml_str(yaml).unwrap();
        assert!(raw.exchanges[0].response.is_none());
    }

    #[test]
    fn test_parse_yaml_binary_id() {
        let yaml = "exchanges:\n  - name: Blink\n    binary_id: [0x02]\n    request: []\n    response: []\n";
        let raw = RawContract::from_yaml_str(yaml).unwrap();
        assert_eq!(raw.exchanges[0].binary_id, Some(vec![0x02]));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let yaml = "exchanges: []\nbaud: 9600\n";
        assert!(matches!(
            RawContract::from_yaml_str(yaml),
            Err(ContractError::Yaml(_))
        ));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"encoding": "text", "exchanges": [{"name": "Blink", "request": [], "response": []}]}"#;
        let raw = RawContract::from_json_str(json).unwrap();
        assert_eq!(raw.encoding, Some(EncodingKind::Text));
        assert_eq!(raw.exchanges[0].name, "Blink");
    }

    #[test]
    fn test_builder_declares_field_sets() {
        let raw = RawExchange::new("MeasureVoltage")
            .request_field("channel", SemanticType::Integer)
            .response_field("voltage", SemanticType::Float);
        assert_eq!(raw.request.as_ref().map(FieldSet::len), Some(1));
        assert_eq!(raw.response.as_ref().map(FieldSet::len), Some(1));
    }
}
