//! Host client for a hardsync contract.
//!
//! Generated by hardsync. Regenerate from the contract instead of editing.

#![allow(unused_imports)]

use hardsync_client::{
    Client, ClientResult, EncodingKind, Exchange, FieldSet, FieldValue, FieldValues, SemanticType,
};
use std::io::{Read, Write};

/// Baud rate declared by the contract.
pub const BAUD_RATE: u32 = 115200;

/// Device identifier declared by the contract; empty when unknown.
pub const DEVICE_IDENTIFIER: &str = "A50285BI";

/// Wire encoding declared by the contract.
pub const ENCODING: EncodingKind = EncodingKind::Text;

/// Every exchange declared by the contract.
pub fn exchanges() -> Vec<Exchange> {
    vec![
        Exchange::new(
            "MeasureVoltage",
            FieldSet::new()
                .with("integration_time", SemanticType::Float)
                .with("channel", SemanticType::Integer),
            FieldSet::new()
                .with("voltage", SemanticType::Float),
        )
        .with_binary_id(vec![0x02]),
        Exchange::new(
            "Identify",
            FieldSet::new(),
            FieldSet::new()
                .with("name", SemanticType::Text)
                .with("revision", SemanticType::Integer),
        ),
    ]
}

/// Response of the `Identify` exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyResponse {
    pub name: String,
    pub revision: i64,
}

/// Typed access to a device running the generated firmware.
pub struct DeviceClient<T: Read + Write> {
    client: Client<T>,
}

impl<T: Read + Write> DeviceClient<T> {
    /// Wrap an open transport.
    pub fn new(transport: T) -> Self {
        DeviceClient {
            client: Client::new(transport, ENCODING, exchanges()),
        }
    }

    /// Adopt a connected client, such as the one discovery returns, keeping
    /// any bytes it has already read.
    pub fn from_client(client: Client<T>) -> Self {
        DeviceClient {
            client: client.with_exchanges(ENCODING, exchanges()),
        }
    }

    /// The underlying untyped client.
    pub fn client(&mut self) -> &mut Client<T> {
        &mut self.client
    }

    /// Check that the device is responding.
    pub fn request_ping(&mut self) -> ClientResult<()> {
        self.client.ping()
    }

    /// Perform the `MeasureVoltage` exchange.
    pub fn request_measure_voltage(&mut self, integration_time: f64, channel: i64) -> ClientResult<f64> {
        let response = self.client.request(
            "MeasureVoltage",
            [
                ("integration_time".to_string(), FieldValue::from(integration_time)),
                ("channel".to_string(), FieldValue::from(channel)),
            ]
            .into_iter()
            .collect(),
        )?;
        response.float("voltage")
    }

    /// Perform the `Identify` exchange.
    pub fn request_identify(&mut self) -> ClientResult<IdentifyResponse> {
        let response = self.client.request(
            "Identify",
            FieldValues::new(),
        )?;
        Ok(IdentifyResponse {
            name: response.text("name")?,
            revision: response.integer("revision")?,
        })
    }
}
