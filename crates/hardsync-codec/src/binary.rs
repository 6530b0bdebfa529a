//! Compact binary encoding.
//!
//! ```text
//! +--------+--------+-----------+--------------------------------+
//! | len_lo | len_hi | id | req  | (signifier, value)*            |
//! +--------+--------+-----------+--------------------------------+
//! ```
//!
//! `len` counts payload bytes only. The high bit of the identifier byte is
//! set for requests. Fields are written in declaration order, so decode
//! attributes each value to its declared field name. Text fields cannot be
//! carried.

use crate::encoding::{ordered_values, require_all};
use crate::{CodecError, CodecResult, DecodedExchange, Encoding, ExchangeTable};
use bytes::{Buf, BufMut};
use hardsync_contract::{
    EncodingKind, Exchange, FieldValue, FieldValues, SemanticType, BINARY_ID_WIDTH,
    BINARY_REQUEST_MASK,
};

/// Width of the little-endian payload length.
pub const LENGTH_WIDTH: usize = 2;
/// Width of the identifier byte.
pub const IDENTIFIER_WIDTH: usize = BINARY_ID_WIDTH;
/// Bytes before the payload.
pub const HEADER_LEN: usize = LENGTH_WIDTH + IDENTIFIER_WIDTH;
/// Identifier bit marking a request.
pub const REQUEST_MASK: u8 = BINARY_REQUEST_MASK;
/// Largest payload the length header can describe.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

// ============================================================================
// Type Signifiers
// ============================================================================

/// Tag byte preceding each binary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Signifier {
    /// 4-byte little-endian two's complement.
    Integer = 0x01,
    /// 4-byte little-endian IEEE-754 single precision.
    Float = 0x02,
    /// No value bytes.
    None = 0x03,
}

impl Signifier {
    /// Parse a signifier byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Signifier::Integer),
            0x02 => Some(Signifier::Float),
            0x03 => Some(Signifier::None),
            _ => None,
        }
    }

    /// The signifier carrying `ty`, if the binary encoding supports it.
    pub fn for_type(ty: SemanticType) -> Option<Self> {
        match ty {
            SemanticType::Integer => Some(Signifier::Integer),
            SemanticType::Float => Some(Signifier::Float),
            SemanticType::None => Some(Signifier::None),
            SemanticType::Text => None,
        }
    }

    /// The semantic type this signifier carries.
    pub fn semantic_type(self) -> SemanticType {
        match self {
            Signifier::Integer => SemanticType::Integer,
            Signifier::Float => SemanticType::Float,
            Signifier::None => SemanticType::None,
        }
    }

    /// Width of the value following the signifier.
    pub fn width(self) -> usize {
        match self {
            Signifier::Integer | Signifier::Float => 4,
            Signifier::None => 0,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// The binary encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryEncoding;

impl BinaryEncoding {
    /// The exchange's identifier byte, checked for width and mask safety.
    pub fn identifier(exchange: &Exchange) -> CodecResult<u8> {
        let id = exchange
            .binary_id()
            .ok_or_else(|| CodecError::MissingIdentifier(exchange.name().to_string()))?;
        let invalid = |reason: String| CodecError::InvalidIdentifier {
            exchange: exchange.name().to_string(),
            reason,
        };
        match id {
            [byte] if byte & REQUEST_MASK != 0 => Err(invalid(format!(
                "0x{:02X} collides with the request bit",
                byte
            ))),
            [byte] => Ok(*byte),
            _ => Err(invalid(format!(
                "expected {} byte(s), got {}",
                IDENTIFIER_WIDTH,
                id.len()
            ))),
        }
    }

    fn put_value(payload: &mut Vec<u8>, field: &str, value: &FieldValue) -> CodecResult<()> {
        let out_of_range = || CodecError::ValueOutOfRange {
            field: field.to_string(),
            value: match value {
                FieldValue::Integer(v) => v.to_string(),
                FieldValue::Float(v) => v.to_string(),
                _ => String::new(),
            },
        };
        match value {
            FieldValue::Integer(v) => {
                let narrow = i32::try_from(*v).map_err(|_| out_of_range())?;
                payload.put_u8(Signifier::Integer as u8);
                payload.put_i32_le(narrow);
            }
            FieldValue::Float(v) => {
                // Only values an f32 holds exactly survive the trip.
                let narrow = *v as f32;
                if !v.is_finite() || f64::from(narrow) != *v {
                    return Err(out_of_range());
                }
                payload.put_u8(Signifier::Float as u8);
                payload.put_f32_le(narrow);
            }
            FieldValue::None => payload.put_u8(Signifier::None as u8),
            FieldValue::Text(_) => {
                return Err(CodecError::UnsupportedType {
                    field: field.to_string(),
                    ty: SemanticType::Text,
                })
            }
        }
        Ok(())
    }

    fn get_value(buf: &mut &[u8], field: &str, ty: SemanticType) -> CodecResult<FieldValue> {
        let expected =
            Signifier::for_type(ty).ok_or_else(|| CodecError::UnsupportedType {
                field: field.to_string(),
                ty,
            })?;
        let byte = buf.get_u8();
        let signifier = Signifier::from_byte(byte).ok_or(CodecError::UnknownSignifier(byte))?;
        if signifier != expected {
            return Err(CodecError::TypeMismatch {
                field: field.to_string(),
                expected: ty,
                actual: signifier.semantic_type(),
            });
        }
        if buf.remaining() < signifier.width() {
            return Err(CodecError::Truncated {
                field: field.to_string(),
            });
        }
        Ok(match signifier {
            Signifier::Integer => FieldValue::Integer(buf.get_i32_le().into()),
            Signifier::Float => FieldValue::Float(buf.get_f32_le().into()),
            Signifier::None => FieldValue::None,
        })
    }
}

impl Encoding for BinaryEncoding {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Binary
    }

    fn encode(
        &self,
        exchange: &Exchange,
        values: &FieldValues,
        is_request: bool,
    ) -> CodecResult<Vec<u8>> {
        let id = Self::identifier(exchange)?;
        let message = exchange.message_name(is_request);
        let fields = exchange.fields(is_request);

        let mut payload = Vec::new();
        for (name, value) in ordered_values(&message, fields, values)? {
            Self::put_value(&mut payload, name, value)?;
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(CodecError::FrameTooLong {
                max: MAX_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.put_u16_le(payload.len() as u16);
        frame.put_u8(if is_request { id | REQUEST_MASK } else { id });
        frame.extend_from_slice(&payload);

        log::trace!("encoded {} into {} byte(s)", message, frame.len());
        Ok(frame)
    }

    fn decode(&self, table: &ExchangeTable, bytes: &[u8]) -> CodecResult<DecodedExchange> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::FrameTooShort {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let mut buf = bytes;
        let declared = buf.get_u16_le() as usize;
        let actual = bytes.len() - HEADER_LEN;
        if declared != actual {
            return Err(CodecError::LengthMismatch { declared, actual });
        }

        let raw_id = buf.get_u8();
        let is_request = raw_id & REQUEST_MASK != 0;
        let id = raw_id & !REQUEST_MASK;
        let exchange = table
            .by_binary_id(id)
            .ok_or(CodecError::UnknownIdentifier(id))?;
        let message = exchange.message_name(is_request);
        let fields = exchange.fields(is_request);

        let mut values = FieldValues::new();
        for field in fields {
            if !buf.has_remaining() {
                break;
            }
            let value = Self::get_value(&mut buf, &field.name, field.ty)?;
            values.insert(field.name.clone(), value);
        }
        require_all(&message, fields, &values)?;
        if buf.has_remaining() {
            return Err(CodecError::TrailingBytes(buf.remaining()));
        }

        log::trace!("decoded {} with {} field(s)", message, values.len());
        Ok(DecodedExchange::new(message, values))
    }

    fn frame_length(&self, buffered: &[u8]) -> Option<usize> {
        if buffered.len() < LENGTH_WIDTH {
            return None;
        }
        let payload = u16::from_le_bytes([buffered[0], buffered[1]]) as usize;
        Some(HEADER_LEN + payload)
    }
}
