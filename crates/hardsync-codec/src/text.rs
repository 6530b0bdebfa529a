//! Human-readable text encoding.
//!
//! Each message is one ASCII line:
//!
//! ```text
//! MeasureVoltageRequest(integration_time=0.5,channel=4)\n
//! ^ name + direction    ^ key=value pairs in declaration order
//! ```
//!
//! Delimiters are not escaped, so text values may not contain them.

use crate::encoding::{ordered_values, require_all};
use crate::{CodecError, CodecResult, DecodedExchange, Encoding, ExchangeTable};
use hardsync_contract::{
    split_message_name, EncodingKind, Exchange, FieldSet, FieldValue, FieldValues, SemanticType,
};

/// Opens the argument list.
pub const ARGUMENT_BEGINNER: char = '(';
/// Closes the argument list.
pub const ARGUMENT_ENDER: char = ')';
/// Separates arguments.
pub const ARGUMENT_DELIMITER: char = ',';
/// Separates an argument's key from its value.
pub const ARGUMENT_ASSIGNER: char = '=';
/// Ends every message.
pub const EXCHANGE_TERMINATOR: char = '\n';

/// Characters a text value may not contain.
pub const RESERVED_CHARACTERS: [char; 5] = [
    ARGUMENT_BEGINNER,
    ARGUMENT_ENDER,
    ARGUMENT_DELIMITER,
    ARGUMENT_ASSIGNER,
    EXCHANGE_TERMINATOR,
];

/// The text encoding. This is the default for contracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextEncoding;

impl TextEncoding {
    fn encode_value(field: &str, value: &FieldValue) -> CodecResult<String> {
        match value {
            FieldValue::Float(v) if !v.is_finite() => Err(CodecError::ValueOutOfRange {
                field: field.to_string(),
                value: v.to_string(),
            }),
            // Debug keeps the decimal point, so 1.0 stays distinguishable from 1.
            FieldValue::Float(v) => Ok(format!("{:?}", v)),
            FieldValue::Integer(v) => Ok(v.to_string()),
            FieldValue::Text(text) => {
                if !text.is_ascii() {
                    return Err(CodecError::NonAscii);
                }
                if let Some(character) = text.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
                    return Err(CodecError::ReservedCharacter {
                        field: field.to_string(),
                        character,
                    });
                }
                Ok(text.clone())
            }
            FieldValue::None => Ok(String::new()),
        }
    }

    fn decode_value(field: &str, ty: SemanticType, raw: &str) -> CodecResult<FieldValue> {
        let invalid = || CodecError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
            expected: ty,
        };
        match ty {
            SemanticType::Float => raw.parse().map(FieldValue::Float).map_err(|_| invalid()),
            SemanticType::Integer => raw.parse().map(FieldValue::Integer).map_err(|_| invalid()),
            SemanticType::Text => Ok(FieldValue::Text(raw.to_string())),
            SemanticType::None if raw.is_empty() => Ok(FieldValue::None),
            SemanticType::None => Err(CodecError::Malformed(format!(
                "field `{}` has type none but carries `{}`",
                field, raw
            ))),
        }
    }

    fn decode_arguments(message: &str, fields: &FieldSet, args: &str) -> CodecResult<FieldValues> {
        let mut values = FieldValues::new();
        if args.is_empty() {
            return Ok(values);
        }

        for token in args.split(ARGUMENT_DELIMITER) {
            let (key, raw) = token.split_once(ARGUMENT_ASSIGNER).ok_or_else(|| {
                CodecError::Malformed(format!("argument `{}` has no `{}`", token, ARGUMENT_ASSIGNER))
            })?;
            let field = fields.get(key).ok_or_else(|| CodecError::FieldNotFound {
                message: message.to_string(),
                field: key.to_string(),
            })?;
            let value = Self::decode_value(key, field.ty, raw)?;
            if values.insert(key.to_string(), value).is_some() {
                return Err(CodecError::Malformed(format!(
                    "argument `{}` appears more than once",
                    key
                )));
            }
        }
        Ok(values)
    }
}

/// Strip the terminator, tolerating its absence and a preceding `\r`.
fn strip_terminator(text: &str) -> CodecResult<&str> {
    let body = match text.find(EXCHANGE_TERMINATOR) {
        Some(end) => {
            let trailing = text.len() - end - 1;
            if trailing > 0 {
                return Err(CodecError::TrailingBytes(trailing));
            }
            &text[..end]
        }
        None => text,
    };
    Ok(body.strip_suffix('\r').unwrap_or(body))
}

impl Encoding for TextEncoding {
    fn kind(&self) -> EncodingKind {
        EncodingKind::Text
    }

    fn encode(
        &self,
        exchange: &Exchange,
        values: &FieldValues,
        is_request: bool,
    ) -> CodecResult<Vec<u8>> {
        let message = exchange.message_name(is_request);
        let fields = exchange.fields(is_request);

        let mut args = Vec::with_capacity(fields.len());
        for (name, value) in ordered_values(&message, fields, values)? {
            args.push(format!(
                "{}{}{}",
                name,
                ARGUMENT_ASSIGNER,
                Self::encode_value(name, value)?
            ));
        }

        let line = format!(
            "{}{}{}{}{}",
            message,
            ARGUMENT_BEGINNER,
            args.join(&ARGUMENT_DELIMITER.to_string()),
            ARGUMENT_ENDER,
            EXCHANGE_TERMINATOR
        );
        log::trace!("encoded {}", line.trim_end());
        Ok(line.into_bytes())
    }

    fn decode(&self, table: &ExchangeTable, bytes: &[u8]) -> CodecResult<DecodedExchange> {
        if !bytes.is_ascii() {
            return Err(CodecError::NonAscii);
        }
        let text = std::str::from_utf8(bytes).map_err(|_| CodecError::NonAscii)?;
        let body = strip_terminator(text)?;

        let (message, rest) = body.split_once(ARGUMENT_BEGINNER).ok_or_else(|| {
            CodecError::Malformed(format!("no `{}` in `{}`", ARGUMENT_BEGINNER, body))
        })?;
        let args = rest.strip_suffix(ARGUMENT_ENDER).ok_or_else(|| {
            CodecError::Malformed(format!("`{}` does not end with `{}`", body, ARGUMENT_ENDER))
        })?;
        if args.contains([ARGUMENT_BEGINNER, ARGUMENT_ENDER]) {
            return Err(CodecError::Malformed(format!(
                "nested parentheses in `{}`",
                body
            )));
        }
        if message.is_empty() {
            return Err(CodecError::Malformed("empty message name".to_string()));
        }

        let fields = split_message_name(message)
            .and_then(|(name, is_request)| {
                table
                    .by_name(name)
                    .map(|exchange| exchange.fields(is_request))
            })
            .ok_or_else(|| CodecError::UnknownExchange(message.to_string()))?;

        let values = Self::decode_arguments(message, fields, args)?;
        require_all(message, fields, &values)?;

        log::trace!("decoded {} with {} field(s)", message, values.len());
        Ok(DecodedExchange::new(message, values))
    }

    fn frame_length(&self, buffered: &[u8]) -> Option<usize> {
        buffered
            .iter()
            .position(|&byte| byte == EXCHANGE_TERMINATOR as u8)
            .map(|end| end + 1)
    }
}
