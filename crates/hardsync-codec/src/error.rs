//! Codec error types.

use hardsync_contract::SemanticType;
use thiserror::Error;

/// Errors that can occur while encoding or decoding an exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A decoded key has no declared field in the message's field-set.
    #[error("field `{field}` is not declared by `{message}`")]
    FieldNotFound {
        /// Message name, e.g. `MeasureVoltageRequest`.
        message: String,
        /// The undeclared key.
        field: String,
    },

    /// A declared field has no value.
    #[error("`{message}` is missing field `{field}`")]
    MissingField {
        /// Message name.
        message: String,
        /// The missing field.
        field: String,
    },

    /// A value does not match its field's declared type.
    #[error("field `{field}` expects {expected}, got {actual}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Declared type.
        expected: SemanticType,
        /// Type of the supplied value.
        actual: SemanticType,
    },

    /// The exchange's binary identifier is unusable.
    #[error("exchange `{exchange}` has an invalid binary identifier: {reason}")]
    InvalidIdentifier {
        /// Exchange name.
        exchange: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The exchange declares no binary identifier.
    #[error("exchange `{0}` has no binary identifier")]
    MissingIdentifier(String),

    /// A message name does not resolve to a known exchange.
    #[error("unknown message `{0}`")]
    UnknownExchange(String),

    /// A binary identifier does not resolve to a known exchange.
    #[error("unknown binary identifier: 0x{0:02X}")]
    UnknownIdentifier(u8),

    /// The length header disagrees with the frame size.
    #[error("length header says {declared} payload bytes, frame carries {actual}")]
    LengthMismatch {
        /// Length in the header.
        declared: usize,
        /// Actual payload bytes.
        actual: usize,
    },

    /// Frame is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Frame is too long.
    #[error("frame too long: maximum {max} bytes, got {actual}")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// Unknown binary type signifier.
    #[error("unknown type signifier: 0x{0:02X}")]
    UnknownSignifier(u8),

    /// The payload ended inside a value.
    #[error("payload truncated while reading field `{field}`")]
    Truncated {
        /// Field being read.
        field: String,
    },

    /// Bytes remain after the last declared field or after the terminator.
    #[error("{0} unexpected trailing byte(s)")]
    TrailingBytes(usize),

    /// A text value could not be parsed as its declared numeric type.
    #[error("field `{field}` value `{value}` is not a valid {expected}")]
    InvalidNumber {
        /// Field name.
        field: String,
        /// Raw text.
        value: String,
        /// Declared type.
        expected: SemanticType,
    },

    /// The encoding cannot carry this type.
    #[error("field `{field}` has type {ty}, which this encoding cannot carry")]
    UnsupportedType {
        /// Field name.
        field: String,
        /// The unsupported type.
        ty: SemanticType,
    },

    /// A value does not fit its wire representation.
    #[error("field `{field}` value {value} does not fit the wire representation")]
    ValueOutOfRange {
        /// Field name.
        field: String,
        /// Offending value, as text.
        value: String,
    },

    /// The message does not follow the wire grammar.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// The message contains non-ASCII bytes.
    #[error("message contains non-ASCII data")]
    NonAscii,

    /// A text value contains a character reserved by the framing.
    #[error("field `{field}` value contains reserved character {character:?}")]
    ReservedCharacter {
        /// Field name.
        field: String,
        /// The reserved character.
        character: char,
    },
}

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
