//! Error types for the host client.

use hardsync_codec::CodecError;
use thiserror::Error;

/// Errors raised while talking to a device.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] CodecError),

    /// The device answered with bytes that do not decode.
    #[error("malformed response: {0}")]
    MalformedResponse(#[source] CodecError),

    /// The device answered with an `ErrorResponse`.
    #[error("device reported an error: {0}")]
    ReceivedErrorResponse(String),

    /// The device answered a different exchange.
    #[error("expected {expected}, received {actual}")]
    UnexpectedResponse { expected: String, actual: String },

    /// The transport reached end of stream mid-response.
    #[error("connection closed before a complete response arrived")]
    ConnectionClosed,

    /// The exchange is not known to this client.
    #[error("unknown exchange `{0}`")]
    UnknownExchange(String),

    /// No candidate answered a ping.
    #[error("no compatible device found among {candidates} candidate(s)")]
    DeviceNotFound { candidates: usize },

    /// Serial port failure.
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
