//! Hardsync Host Client
//!
//! Runtime side of a generated host client: performs exchanges with a device
//! over any `Read + Write` byte stream and locates devices by pinging
//! candidate ports.
//!
//! # Protocol Overview
//!
//! Every exchange is a single request from the host followed by a single
//! response from the device. The device may answer any request with an
//! `ErrorResponse(msg=...)`, surfaced as [`ClientError::ReceivedErrorResponse`].
//! Responses are framed by the active encoding: text messages end with a
//! newline, binary messages carry a length prefix.
//!
//! # Example
//!
//! ```rust,ignore
//! use hardsync_client::{discover, SerialCandidate, DEFAULT_PING_TIMEOUT};
//!
//! let contract = Contract::from_path("contract.yaml")?;
//! let found = discover(SerialCandidate::available()?, contract.channel(), DEFAULT_PING_TIMEOUT)?;
//! let mut client = found.client.with_contract(&contract);
//! let voltage = client
//!     .request("MeasureVoltage", values)?
//!     .float("voltage")?;
//! ```

mod client;
mod discovery;
mod error;
mod response;

pub use client::*;
pub use discovery::*;
pub use error::*;
pub use response::*;

// Types referenced by generated clients.
pub use hardsync_contract::{
    Channel, Contract, EncodingKind, Exchange, Field, FieldSet, FieldValue, FieldValues,
    SemanticType,
};
