//! The codec interface shared by every wire encoding.

use crate::{BinaryEncoding, CodecError, CodecResult, ExchangeTable, TextEncoding};
use hardsync_contract::{
    split_message_name, EncodingKind, Exchange, FieldSet, FieldValue, FieldValues,
};

/// A wire encoding: converts exchange field values to bytes and back.
///
/// Implementations are stateless, so one instance may be shared freely
/// between threads.
pub trait Encoding: std::fmt::Debug + Send + Sync {
    /// Which encoding this is.
    fn kind(&self) -> EncodingKind;

    /// Encode the request or response of `exchange` carrying `values`.
    ///
    /// `values` must hold exactly the declared fields, each with its
    /// declared type.
    fn encode(
        &self,
        exchange: &Exchange,
        values: &FieldValues,
        is_request: bool,
    ) -> CodecResult<Vec<u8>>;

    /// Decode one complete message, resolving its exchange through `table`.
    fn decode(&self, table: &ExchangeTable, bytes: &[u8]) -> CodecResult<DecodedExchange>;

    /// Total length of the first message in `buffered`, once it is knowable.
    fn frame_length(&self, buffered: &[u8]) -> Option<usize>;
}

/// A decoded wire message.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedExchange {
    /// Message name, e.g. `MeasureVoltageResponse`.
    pub name: String,
    /// Field values keyed by field name.
    pub values: FieldValues,
}

impl DecodedExchange {
    /// Create a decoded message.
    pub fn new(name: impl Into<String>, values: FieldValues) -> Self {
        DecodedExchange {
            name: name.into(),
            values,
        }
    }

    /// Exchange name without the `Request`/`Response` suffix.
    pub fn exchange_name(&self) -> &str {
        split_message_name(&self.name)
            .map(|(name, _)| name)
            .unwrap_or(&self.name)
    }

    /// Whether the message is a request.
    pub fn is_request(&self) -> bool {
        matches!(split_message_name(&self.name), Some((_, true)))
    }

    /// Value of a field.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }
}

static TEXT: TextEncoding = TextEncoding;
static BINARY: BinaryEncoding = BinaryEncoding;

/// The implementation of an encoding kind.
pub fn codec_for(kind: EncodingKind) -> &'static dyn Encoding {
    match kind {
        EncodingKind::Text => &TEXT,
        EncodingKind::Binary => &BINARY,
    }
}

/// Check that `values` holds exactly the fields of `fields`, with matching
/// types. Yields the fields with their values in declaration order.
pub(crate) fn ordered_values<'a>(
    message: &str,
    fields: &'a FieldSet,
    values: &'a FieldValues,
) -> CodecResult<Vec<(&'a str, &'a FieldValue)>> {
    if let Some(extra) = values.keys().find(|key| fields.get(key).is_none()) {
        return Err(CodecError::FieldNotFound {
            message: message.to_string(),
            field: extra.clone(),
        });
    }

    fields
        .iter()
        .map(|field| {
            let value = values.get(&field.name).ok_or_else(|| CodecError::MissingField {
                message: message.to_string(),
                field: field.name.clone(),
            })?;
            if value.semantic_type() != field.ty {
                return Err(CodecError::TypeMismatch {
                    field: field.name.clone(),
                    expected: field.ty,
                    actual: value.semantic_type(),
                });
            }
            Ok((field.name.as_str(), value))
        })
        .collect()
}

/// Fail with `MissingField` if a declared field was not decoded.
pub(crate) fn require_all(
    message: &str,
    fields: &FieldSet,
    values: &FieldValues,
) -> CodecResult<()> {
    match fields.iter().find(|field| !values.contains_key(&field.name)) {
        Some(field) => Err(CodecError::MissingField {
            message: message.to_string(),
            field: field.name.clone(),
        }),
        None => Ok(()),
    }
}
