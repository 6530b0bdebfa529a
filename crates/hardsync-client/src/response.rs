//! Typed access to decoded responses.

use crate::{ClientError, ClientResult};
use hardsync_codec::{CodecError, DecodedExchange};
use hardsync_contract::{FieldValue, FieldValues, SemanticType};

/// A decoded response from the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    name: String,
    values: FieldValues,
}

impl Response {
    /// Message name, e.g. `MeasureVoltageResponse`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All decoded values.
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Consume the response, keeping its values.
    pub fn into_values(self) -> FieldValues {
        self.values
    }

    fn missing(&self, field: &str) -> ClientError {
        ClientError::MalformedResponse(CodecError::MissingField {
            message: self.name.clone(),
            field: field.to_string(),
        })
    }

    fn mismatch(field: &str, expected: SemanticType, actual: &FieldValue) -> ClientError {
        ClientError::MalformedResponse(CodecError::TypeMismatch {
            field: field.to_string(),
            expected,
            actual: actual.semantic_type(),
        })
    }

    /// A float field.
    pub fn float(&self, field: &str) -> ClientResult<f64> {
        match self.values.get(field) {
            Some(FieldValue::Float(value)) => Ok(*value),
            Some(other) => Err(Self::mismatch(field, SemanticType::Float, other)),
            None => Err(self.missing(field)),
        }
    }

    /// An integer field.
    pub fn integer(&self, field: &str) -> ClientResult<i64> {
        match self.values.get(field) {
            Some(FieldValue::Integer(value)) => Ok(*value),
            Some(other) => Err(Self::mismatch(field, SemanticType::Integer, other)),
            None => Err(self.missing(field)),
        }
    }

    /// A text field.
    pub fn text(&self, field: &str) -> ClientResult<String> {
        match self.values.get(field) {
            Some(FieldValue::Text(value)) => Ok(value.clone()),
            Some(other) => Err(Self::mismatch(field, SemanticType::Text, other)),
            None => Err(self.missing(field)),
        }
    }

    /// A field carrying no value; succeeds if it is present.
    pub fn none(&self, field: &str) -> ClientResult<()> {
        match self.values.get(field) {
            Some(FieldValue::None) => Ok(()),
            Some(other) => Err(Self::mismatch(field, SemanticType::None, other)),
            None => Err(self.missing(field)),
        }
    }
}

impl From<DecodedExchange> for Response {
    fn from(decoded: DecodedExchange) -> Self {
        Response {
            name: decoded.name,
            values: decoded.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> Response {
        let values: FieldValues = [
            ("voltage".to_string(), FieldValue::Float(1.5)),
            ("count".to_string(), FieldValue::Integer(3)),
            ("label".to_string(), FieldValue::from("ok")),
            ("done".to_string(), FieldValue::None),
        ]
        .into_iter()
        .collect();
        DecodedExchange::new("ReadResponse", values).into()
    }

    #[test]
    fn test_typed_getters() {
        let response = response();
        assert_eq!(response.name(), "ReadResponse");
        assert_eq!(response.float("voltage").unwrap(), 1.5);
        assert_eq!(response.integer("count").unwrap(), 3);
        assert_eq!(response.text("label").unwrap(), "ok");
        assert!(response.none("done").is_ok());
    }

    #[test]
    fn test_missing_field() {
        assert!(matches!(
            response().float("current"),
            Err(ClientError::MalformedResponse(CodecError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_wrong_type() {
        match response().integer("voltage") {
            Err(ClientError::MalformedResponse(CodecError::TypeMismatch {
                expected, actual, ..
            })) => {
                assert_eq!(expected, SemanticType::Integer);
                assert_eq!(actual, SemanticType::Float);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
