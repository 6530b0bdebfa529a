//! Blocking request/response client over any byte transport.

use crate::{ClientError, ClientResult, Response};
use hardsync_codec::{codec_for, Encoding, ExchangeTable, FrameBuffer};
use hardsync_contract::{
    Contract, EncodingKind, Exchange, FieldValue, FieldValues, ERROR_MESSAGE_FIELD,
};
use std::io::{Read, Write};
use tracing::{debug, trace};

/// Name of the built-in exchange devices use to report failures.
const ERROR_EXCHANGE: &str = "Error";

/// Size of each transport read.
const READ_CHUNK: usize = 256;

/// Talks to one device: encodes a request, writes it, and reads until a
/// whole response has arrived.
///
/// Requests are strictly sequential; the device answers each request with
/// exactly one response before the next is sent. Bytes read past the end of
/// one response are kept for the next.
pub struct Client<T> {
    transport: T,
    codec: &'static dyn Encoding,
    table: ExchangeTable,
    frames: FrameBuffer,
}

impl<T: Read + Write> Client<T> {
    /// Create a client for `exchanges` (plus the built-in ones).
    pub fn new(
        transport: T,
        encoding: EncodingKind,
        exchanges: impl IntoIterator<Item = Exchange>,
    ) -> Self {
        Client {
            transport,
            codec: codec_for(encoding),
            table: ExchangeTable::new(exchanges),
            frames: FrameBuffer::new(),
        }
    }

    /// Create a client for every exchange of `contract`.
    pub fn from_contract(transport: T, contract: &Contract) -> Self {
        Self::new(
            transport,
            contract.encoding(),
            contract.exchanges().iter().cloned(),
        )
    }

    /// Switch to `encoding` and `exchanges` (plus the built-in ones),
    /// keeping the transport and any bytes already read from it.
    pub fn with_exchanges(
        self,
        encoding: EncodingKind,
        exchanges: impl IntoIterator<Item = Exchange>,
    ) -> Self {
        Client {
            codec: codec_for(encoding),
            table: ExchangeTable::new(exchanges),
            ..self
        }
    }

    /// Switch to the encoding and exchanges of `contract`, keeping the
    /// transport and any bytes already read from it.
    pub fn with_contract(self, contract: &Contract) -> Self {
        self.with_exchanges(contract.encoding(), contract.exchanges().iter().cloned())
    }

    /// Number of bytes read from the transport but not yet decoded.
    pub fn buffered_len(&self) -> usize {
        self.frames.buffered_len()
    }

    /// The encoding in use.
    pub fn encoding(&self) -> EncodingKind {
        self.codec.kind()
    }

    /// Exchanges this client can perform.
    pub fn exchanges(&self) -> &ExchangeTable {
        &self.table
    }

    /// Perform `exchange` with the given request values.
    pub fn request(&mut self, exchange: &str, values: FieldValues) -> ClientResult<Response> {
        let target = self
            .table
            .by_name(exchange)
            .ok_or_else(|| ClientError::UnknownExchange(exchange.to_string()))?;
        let expected = target.message_name(false);
        let bytes = self
            .codec
            .encode(target, &values, true)
            .map_err(ClientError::Encode)?;

        debug!("sending {} ({} bytes)", target.message_name(true), bytes.len());
        self.transport.write_all(&bytes)?;
        self.transport.flush()?;

        let frame = self.read_frame()?;
        let decoded = self
            .codec
            .decode(&self.table, &frame)
            .map_err(ClientError::MalformedResponse)?;
        trace!("received {:?}", decoded);

        if decoded.exchange_name() == ERROR_EXCHANGE && !decoded.is_request() {
            let message = match decoded.value(ERROR_MESSAGE_FIELD) {
                Some(FieldValue::Text(message)) => message.clone(),
                _ => String::new(),
            };
            return Err(ClientError::ReceivedErrorResponse(message));
        }
        if decoded.name != expected {
            return Err(ClientError::UnexpectedResponse {
                expected,
                actual: decoded.name,
            });
        }
        Ok(decoded.into())
    }

    /// Perform the built-in `Ping` exchange.
    pub fn ping(&mut self) -> ClientResult<()> {
        let name = self.table.ping().name().to_string();
        self.request(&name, FieldValues::new()).map(|_| ())
    }

    fn read_frame(&mut self) -> ClientResult<Vec<u8>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self
                .frames
                .next_frame(self.codec)
                .map_err(ClientError::MalformedResponse)?
            {
                return Ok(frame);
            }
            let n = self.transport.read(&mut chunk)?;
            if n == 0 {
                return Err(ClientError::ConnectionClosed);
            }
            trace!("read {} bytes", n);
            self.frames.push(&chunk[..n]);
        }
    }

    /// The underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("encoding", &self.codec.kind())
            .field("exchanges", &self.table.len())
            .field("buffered", &self.frames.buffered_len())
            .finish()
    }
}
