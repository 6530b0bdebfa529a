//! Hardsync Wire Codec
//!
//! Converts exchange field values to bytes and back. Both sides of a serial
//! link run the same codec, so the framing here is bit-exact.
//!
//! # Protocol Overview
//!
//! Two interchangeable encodings implement [`Encoding`]:
//!
//! - [`TextEncoding`] (default): `MeasureVoltageRequest(integration_time=0.5,channel=4)\n`
//! - [`BinaryEncoding`]: `[len: u16 LE][id | 0x80 if request][(signifier, value)*]`
//!
//! Decoding resolves the message against an [`ExchangeTable`] and returns a
//! [`DecodedExchange`]: the message name plus typed values keyed by field
//! name. Ill-typed or malformed input is rejected, never coerced.
//!
//! # Example
//!
//! ```rust,ignore
//! use hardsync_codec::{codec_for, ExchangeTable};
//!
//! let codec = codec_for(contract.encoding());
//! let table = ExchangeTable::from_contract(&contract);
//!
//! let bytes = codec.encode(exchange, &values, true)?;
//! let decoded = codec.decode(&table, &bytes)?;
//! assert_eq!(decoded.values, values);
//! ```

mod binary;
mod encoding;
mod error;
mod framing;
mod table;
mod text;

pub use binary::*;
pub use encoding::{codec_for, DecodedExchange, Encoding};
pub use error::*;
pub use framing::*;
pub use table::*;
pub use text::*;
