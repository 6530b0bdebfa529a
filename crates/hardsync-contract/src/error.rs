//! Contract error types.

use crate::{EncodingKind, SemanticType};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a contract.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The contract failed validation. Every violation found is listed.
    #[error("invalid contract, {}", bullet_list(.0))]
    Invalid(Vec<Violation>),

    /// The contract file could not be read.
    #[error("failed to read contract {}: {source}", .path.display())]
    Io {
        /// Path of the contract file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contract is not valid YAML for the contract schema.
    #[error("failed to parse YAML contract: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The contract is not valid JSON for the contract schema.
    #[error("failed to parse JSON contract: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContractError {
    /// The validation violations, if this is a validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            ContractError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

/// A single problem found while validating a contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// An exchange declares no request field-set.
    #[error("exchange `{exchange}` has a Response but no Request")]
    MissingRequest {
        /// Exchange name.
        exchange: String,
    },

    /// An exchange declares no response field-set.
    #[error("exchange `{exchange}` has a Request but no Response")]
    MissingResponse {
        /// Exchange name.
        exchange: String,
    },

    /// Two exchanges share a name.
    #[error("exchange `{exchange}` is declared more than once")]
    DuplicateExchange {
        /// Exchange name.
        exchange: String,
    },

    /// The exchange name is reserved for a built-in exchange.
    #[error("exchange name `{exchange}` is reserved")]
    ReservedExchangeName {
        /// Exchange name.
        exchange: String,
    },

    /// Two differently spelled exchanges generate the same method names.
    #[error("exchanges `{first}` and `{second}` both generate `{snake_case}`")]
    CollidingExchangeNames {
        /// The exchange declared first.
        first: String,
        /// The exchange declared later.
        second: String,
        /// The shared snake-case form.
        snake_case: String,
    },

    /// The exchange name is not a valid identifier.
    #[error("exchange name `{exchange}` is not a valid identifier")]
    InvalidExchangeName {
        /// Exchange name.
        exchange: String,
    },

    /// A field name is not a valid identifier.
    #[error("field `{field}` of exchange `{exchange}` is not a valid identifier")]
    InvalidFieldName {
        /// Exchange name.
        exchange: String,
        /// Field name.
        field: String,
    },

    /// A field name is a keyword or a name the generated code declares.
    #[error("field name `{field}` of exchange `{exchange}` is reserved in generated code")]
    ReservedFieldName {
        /// Exchange name.
        exchange: String,
        /// Field name.
        field: String,
    },

    /// A field name appears twice in one field-set.
    #[error("field `{field}` is declared more than once in exchange `{exchange}`")]
    DuplicateField {
        /// Exchange name.
        exchange: String,
        /// Field name.
        field: String,
    },

    /// The type mapping lacks one of the required semantic types.
    #[error("type mapping is missing required types: {}", type_list(.missing))]
    TypeMappingIncomplete {
        /// Required types without an entry.
        missing: Vec<SemanticType>,
    },

    /// A field uses a semantic type the type mapping does not cover.
    #[error("field `{field}` of exchange `{exchange}` uses type `{ty}` which the type mapping does not cover")]
    UnmappedType {
        /// Exchange name.
        exchange: String,
        /// Field name.
        field: String,
        /// The unmapped type.
        ty: SemanticType,
    },

    /// A type mapping entry maps to an empty name.
    #[error("type mapping entry for `{ty}` is empty")]
    EmptyTypeName {
        /// The semantic type with the empty entry.
        ty: SemanticType,
    },

    /// The selected encoding is not supported for contracts.
    #[error("encoding `{encoding}` is not supported; use `text`")]
    UnsupportedEncoding {
        /// The selected encoding.
        encoding: EncodingKind,
    },

    /// The channel baud rate is not a standard serial speed.
    #[error("baud rate {baud_rate} is not a standard serial speed")]
    UnsupportedBaudRate {
        /// The requested rate.
        baud_rate: u32,
    },

    /// A binary identifier is malformed.
    #[error("binary identifier of exchange `{exchange}` is invalid: {reason}")]
    InvalidBinaryId {
        /// Exchange name.
        exchange: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two exchanges share a binary identifier.
    #[error("binary identifier {id:02X?} of exchange `{exchange}` is already in use")]
    DuplicateBinaryId {
        /// Exchange name.
        exchange: String,
        /// The identifier bytes.
        id: Vec<u8>,
    },
}

fn bullet_list(violations: &[Violation]) -> String {
    let mut list = format!("{} violation(s):", violations.len());
    for violation in violations {
        list.push_str(&format!("\n  - {}", violation));
    }
    list
}

fn type_list(types: &[SemanticType]) -> String {
    types
        .iter()
        .map(SemanticType::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_lists_every_violation() {
        let err = ContractError::Invalid(vec![
            Violation::MissingResponse {
                exchange: "MeasureVoltage".to_string(),
            },
            Violation::UnsupportedBaudRate { baud_rate: 1234 },
        ]);
        let message = err.to_string();
        assert!(message.contains("2 violation(s)"));
        assert!(message.contains("`MeasureVoltage` has a Request but no Response"));
        assert!(message.contains("baud rate 1234"));
    }

    #[test]
    fn test_type_mapping_message_lists_types() {
        let violation = Violation::TypeMappingIncomplete {
            missing: vec![SemanticType::Text, SemanticType::None],
        };
        assert!(violation.to_string().contains("text, none"));
    }
}
