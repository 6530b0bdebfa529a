//! Default completion and validation of contracts.

use crate::{
    is_reserved_exchange_name, is_reserved_field_name, is_valid_identifier, to_snake_case,
    BaudRate, Channel, ContractError, ContractResult, Exchange, FieldSet, RawChannel, RawContract,
    RawExchange, SemanticType, TypeMapping, Violation, PING_BINARY_ID,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Number of bytes in a binary exchange identifier.
pub const BINARY_ID_WIDTH: usize = 1;

/// Bit of the identifier byte that marks a binary frame as a request.
pub const BINARY_REQUEST_MASK: u8 = 0b1000_0000;

// ============================================================================
// Encoding Selection
// ============================================================================

/// Wire encodings a contract can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingKind {
    /// Human-readable `NameRequest(k=v,...)\n` lines.
    #[default]
    #[serde(alias = "ascii")]
    Text,
    /// Compact length-prefixed frames.
    Binary,
}

impl EncodingKind {
    /// Whether contracts may select this encoding.
    pub fn is_production_ready(self) -> bool {
        matches!(self, EncodingKind::Text)
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingKind::Text => write!(f, "text"),
            EncodingKind::Binary => write!(f, "binary"),
        }
    }
}

// ============================================================================
// Contract
// ============================================================================

/// A complete, validated, immutable contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    exchanges: Vec<Exchange>,
    encoding: EncodingKind,
    channel: Channel,
    type_mapping: TypeMapping,
}

impl Contract {
    /// Complete `raw` with system defaults and validate it.
    ///
    /// All violations found are returned together in
    /// [`ContractError::Invalid`].
    pub fn load(raw: RawContract) -> ContractResult<Self> {
        let completed = CompletedContract::from_raw(raw);
        completed.validate().map_err(ContractError::Invalid)
    }

    /// Read, complete, and validate a contract file.
    pub fn from_path(path: impl AsRef<Path>) -> ContractResult<Self> {
        Self::load(RawContract::from_path(path)?)
    }

    /// Declared exchanges, in declaration order. Built-ins are not included.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Look up a declared exchange by name.
    pub fn exchange(&self, name: &str) -> Option<&Exchange> {
        self.exchanges.iter().find(|ex| ex.name() == name)
    }

    /// Selected encoding.
    pub fn encoding(&self) -> EncodingKind {
        self.encoding
    }

    /// Channel declaration.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Type mapping for generated device code.
    pub fn type_mapping(&self) -> &TypeMapping {
        &self.type_mapping
    }
}

// ============================================================================
// Default Completion
// ============================================================================

/// A raw contract with every optional section filled in.
struct CompletedContract {
    exchanges: Vec<RawExchange>,
    encoding: EncodingKind,
    channel: RawChannel,
    type_mapping: TypeMapping,
}

impl CompletedContract {
    /// Substitute system defaults for each omitted section independently.
    fn from_raw(raw: RawContract) -> Self {
        let encoding = raw.encoding.unwrap_or_else(|| {
            log::debug!("contract declares no encoding, using {}", EncodingKind::default());
            EncodingKind::default()
        });
        let channel = raw.channel.unwrap_or_else(|| {
            log::debug!("contract declares no channel, using defaults");
            RawChannel::default()
        });
        let type_mapping = raw.type_mapping.unwrap_or_else(|| {
            log::debug!("contract declares no type mapping, using defaults");
            TypeMapping::default()
        });

        CompletedContract {
            exchanges: raw.exchanges,
            encoding,
            channel,
            type_mapping,
        }
    }

    /// Check every rule and build the contract, or return all violations.
    fn validate(self) -> Result<Contract, Vec<Violation>> {
        let mut violations = Vec::new();

        let exchanges = check_exchanges(&self.exchanges, &mut violations);
        check_type_mapping(&self.type_mapping, &self.exchanges, &mut violations);

        if !self.encoding.is_production_ready() {
            violations.push(Violation::UnsupportedEncoding {
                encoding: self.encoding,
            });
        }

        let baud_rate = BaudRate::new(self.channel.baud_rate);
        if baud_rate.is_none() {
            violations.push(Violation::UnsupportedBaudRate {
                baud_rate: self.channel.baud_rate,
            });
        }

        match baud_rate {
            Some(baud_rate) if violations.is_empty() => {
                log::debug!(
                    "validated contract with {} exchange(s) at {} baud",
                    exchanges.len(),
                    baud_rate
                );
                Ok(Contract {
                    exchanges,
                    encoding: self.encoding,
                    channel: Channel::new(baud_rate, self.channel.identifier),
                    type_mapping: self.type_mapping,
                })
            }
            _ => Err(violations),
        }
    }
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Check pairing, naming, and identifiers. Returns the well-formed exchanges.
fn check_exchanges(raw: &[RawExchange], violations: &mut Vec<Violation>) -> Vec<Exchange> {
    let mut names = HashSet::new();
    let mut snake_names: HashMap<String, &str> = HashMap::new();
    let mut binary_ids: HashSet<Vec<u8>> = HashSet::new();
    binary_ids.insert(vec![PING_BINARY_ID]);

    let mut exchanges = Vec::with_capacity(raw.len());
    for declared in raw {
        let name = declared.name.clone();

        if !is_valid_identifier(&name) {
            violations.push(Violation::InvalidExchangeName {
                exchange: name.clone(),
            });
        }
        if is_reserved_exchange_name(&name) {
            violations.push(Violation::ReservedExchangeName {
                exchange: name.clone(),
            });
        }
        if !names.insert(name.clone()) {
            violations.push(Violation::DuplicateExchange {
                exchange: name.clone(),
            });
        }
        let snake_case = to_snake_case(&name);
        match snake_names.get(snake_case.as_str()) {
            Some(first) if *first != name => {
                violations.push(Violation::CollidingExchangeNames {
                    first: first.to_string(),
                    second: name.clone(),
                    snake_case,
                });
            }
            Some(_) => {}
            None => {
                snake_names.insert(snake_case, &declared.name);
            }
        }

        if let Some(id) = &declared.binary_id {
            check_binary_id(&name, id, &mut binary_ids, violations);
        }

        for fields in [&declared.request, &declared.response].into_iter().flatten() {
            check_fields(&name, fields, violations);
        }

        match (&declared.request, &declared.response) {
            (Some(request), Some(response)) => {
                let mut exchange = Exchange::new(name, request.clone(), response.clone());
                if let Some(id) = &declared.binary_id {
                    exchange = exchange.with_binary_id(id.clone());
                }
                exchanges.push(exchange);
            }
            (None, Some(_)) => violations.push(Violation::MissingRequest { exchange: name }),
            (Some(_), None) => violations.push(Violation::MissingResponse { exchange: name }),
            (None, None) => {
                violations.push(Violation::MissingRequest {
                    exchange: name.clone(),
                });
                violations.push(Violation::MissingResponse { exchange: name });
            }
        }
    }
    exchanges
}

fn check_fields(exchange: &str, fields: &FieldSet, violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for field in fields {
        if !is_valid_identifier(&field.name) {
            violations.push(Violation::InvalidFieldName {
                exchange: exchange.to_string(),
                field: field.name.clone(),
            });
        }
        if is_reserved_field_name(&field.name) {
            violations.push(Violation::ReservedFieldName {
                exchange: exchange.to_string(),
                field: field.name.clone(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            violations.push(Violation::DuplicateField {
                exchange: exchange.to_string(),
                field: field.name.clone(),
            });
        }
    }
}

fn check_binary_id(
    exchange: &str,
    id: &[u8],
    seen: &mut HashSet<Vec<u8>>,
    violations: &mut Vec<Violation>,
) {
    let reason = if id.len() != BINARY_ID_WIDTH {
        Some(format!(
            "expected {} byte(s), got {}",
            BINARY_ID_WIDTH,
            id.len()
        ))
    } else if id[0] & BINARY_REQUEST_MASK != 0 {
        Some(format!(
            "0x{:02X} collides with the request bit 0x{:02X}",
            id[0], BINARY_REQUEST_MASK
        ))
    } else {
        None
    };

    match reason {
        Some(reason) => violations.push(Violation::InvalidBinaryId {
            exchange: exchange.to_string(),
            reason,
        }),
        None => {
            if !seen.insert(id.to_vec()) {
                violations.push(Violation::DuplicateBinaryId {
                    exchange: exchange.to_string(),
                    id: id.to_vec(),
                });
            }
        }
    }
}

fn check_type_mapping(
    mapping: &TypeMapping,
    declared: &[RawExchange],
    violations: &mut Vec<Violation>,
) {
    let missing = mapping.missing(SemanticType::ALL);
    if !missing.is_empty() {
        violations.push(Violation::TypeMappingIncomplete { missing });
    }

    for (ty, name) in mapping.iter() {
        if name.trim().is_empty() {
            violations.push(Violation::EmptyTypeName { ty });
        }
    }

    // Declarations missing a field-set are included.
    for exchange in declared {
        let fields = [&exchange.request, &exchange.response]
            .into_iter()
            .flatten()
            .flat_map(|fields| fields.iter());
        for field in fields {
            if !mapping.contains(field.ty) {
                violations.push(Violation::UnmappedType {
                    exchange: exchange.name.clone(),
                    field: field.name.clone(),
                    ty: field.ty,
                });
            }
        }
    }
}
