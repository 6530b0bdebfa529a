//! Drives a checked-in generated host client against canned device output.
//!
//! `generated/measure_client.rs` is the host client the generator emits for
//! the contract in `hardsync-codegen/tests/generate.rs`; a test there fails
//! if the two drift apart.

#[allow(dead_code)]
#[path = "generated/measure_client.rs"]
mod generated;

use generated::{DeviceClient, IdentifyResponse};
use hardsync_client::{discover, Candidate, Channel, ClientError, ClientResult};
use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

/// Replays canned device output and records what was written.
#[derive(Debug)]
struct Wire {
    written: Vec<u8>,
    reply: Cursor<Vec<u8>>,
}

impl Wire {
    fn new(reply: &str) -> Self {
        Wire {
            written: Vec::new(),
            reply: Cursor::new(reply.as_bytes().to_vec()),
        }
    }
}

impl Read for Wire {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reply.read(buf)
    }
}

impl Write for Wire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn written(device: &mut DeviceClient<Wire>) -> String {
    String::from_utf8_lossy(&device.client().get_ref().written).into_owned()
}

#[test]
fn test_generated_constants() {
    assert_eq!(generated::BAUD_RATE, 115_200);
    assert_eq!(generated::DEVICE_IDENTIFIER, "A50285BI");
    let names: Vec<String> = generated::exchanges()
        .iter()
        .map(|exchange| exchange.name().to_string())
        .collect();
    assert_eq!(names, ["MeasureVoltage", "Identify"]);
}

#[test]
fn test_generated_session() {
    let mut device = DeviceClient::new(Wire::new(
        "PingResponse()\n\
         MeasureVoltageResponse(voltage=1.25)\n\
         IdentifyResponse(name=bench meter,revision=3)\n",
    ));

    device.request_ping().unwrap();
    assert_eq!(device.request_measure_voltage(0.5, 2).unwrap(), 1.25);
    assert_eq!(
        device.request_identify().unwrap(),
        IdentifyResponse {
            name: "bench meter".to_string(),
            revision: 3,
        }
    );
    assert_eq!(
        written(&mut device),
        "PingRequest()\n\
         MeasureVoltageRequest(integration_time=0.5,channel=2)\n\
         IdentifyRequest()\n"
    );
}

#[test]
fn test_generated_error_response() {
    let mut device = DeviceClient::new(Wire::new("ErrorResponse(msg=channel out of range)\n"));
    match device.request_measure_voltage(0.5, 9) {
        Err(ClientError::ReceivedErrorResponse(message)) => {
            assert_eq!(message, "channel out of range")
        }
        other => panic!("unexpected {:?}", other),
    }
}

/// A single port that is always present.
#[derive(Debug)]
struct OnlyPort(&'static str);

impl Candidate for OnlyPort {
    type Transport = Wire;

    fn identifier(&self) -> Option<&str> {
        Some(generated::DEVICE_IDENTIFIER)
    }

    fn label(&self) -> String {
        "ttyACM0".to_string()
    }

    fn open(&self, _: &Channel, _: Duration) -> ClientResult<Wire> {
        Ok(Wire::new(self.0))
    }
}

#[test]
fn test_generated_client_adopts_discovered() {
    let channel = Channel::new(
        hardsync_contract::BaudRate::new(generated::BAUD_RATE).unwrap(),
        generated::DEVICE_IDENTIFIER,
    );
    // The device answers the ping and a measurement in one burst.
    let port = OnlyPort("PingResponse()\nMeasureVoltageResponse(voltage=0.75)\n");
    let found = discover([port], &channel, Duration::from_millis(10)).unwrap();

    let mut device = DeviceClient::from_client(found.client);
    assert_eq!(device.request_measure_voltage(0.25, 3).unwrap(), 0.75);
}
