//! Device discovery.
//!
//! Candidates are pinged one at a time. A candidate whose identifier matches
//! the channel's is tried first; the first candidate to answer wins and is
//! handed back as a [`Client`] still holding whatever it has read.

use crate::{Client, ClientError, ClientResult};
use hardsync_contract::{Channel, EncodingKind};
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long each candidate gets to answer.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Something that may be a device speaking the protocol.
pub trait Candidate {
    /// Byte stream to the device.
    type Transport: Read + Write;

    /// Identifier reported by the candidate (e.g. a USB serial number).
    fn identifier(&self) -> Option<&str>;

    /// Human-readable name, for logs.
    fn label(&self) -> String;

    /// Open a transport configured for `channel`. Reads on the returned
    /// transport should fail once `timeout` elapses without data.
    fn open(&self, channel: &Channel, timeout: Duration) -> ClientResult<Self::Transport>;
}

/// A candidate that answered the ping.
#[derive(Debug)]
pub struct Discovered<C: Candidate> {
    /// The matching candidate.
    pub candidate: C,
    /// Text client on the candidate's transport. It knows only the built-in
    /// exchanges; see [`Client::with_contract`].
    pub client: Client<C::Transport>,
}

/// Stable reorder putting candidates whose identifier equals `preferred`
/// first.
fn prioritize<C: Candidate>(candidates: Vec<C>, preferred: &str) -> Vec<C> {
    if preferred.is_empty() {
        return candidates;
    }
    let (mut first, rest): (Vec<C>, Vec<C>) = candidates
        .into_iter()
        .partition(|candidate| candidate.identifier() == Some(preferred));
    first.extend(rest);
    first
}

/// Ping `transport` until it answers or `timeout` runs out.
fn ping_until_answered<T: Read + Write>(transport: T, timeout: Duration) -> Option<Client<T>> {
    let deadline = Instant::now() + timeout;
    let mut client = Client::new(transport, EncodingKind::Text, std::iter::empty());
    loop {
        match client.ping() {
            Ok(()) => return Some(client),
            // Garbage, usually output from before the device reset; try again.
            Err(
                err @ (ClientError::MalformedResponse(_)
                | ClientError::UnexpectedResponse { .. }
                | ClientError::ReceivedErrorResponse(_)),
            ) => debug!("incompatible answer: {}", err),
            Err(err) => {
                debug!("no answer: {}", err);
                return None;
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
    }
}

/// Find the first candidate answering a ping on `channel`.
///
/// Candidates that fail to open are skipped. Returns
/// [`ClientError::DeviceNotFound`] when every candidate has been tried.
pub fn discover<C: Candidate>(
    candidates: impl IntoIterator<Item = C>,
    channel: &Channel,
    timeout: Duration,
) -> ClientResult<Discovered<C>> {
    let candidates = prioritize(candidates.into_iter().collect(), channel.identifier());
    let total = candidates.len();
    if total == 0 {
        warn!("no candidate devices connected");
    }

    for candidate in candidates {
        info!("trying candidate device {}", candidate.label());
        let transport = match candidate.open(channel, timeout) {
            Ok(transport) => transport,
            Err(err) => {
                warn!("unable to open {}: {}", candidate.label(), err);
                continue;
            }
        };
        match ping_until_answered(transport, timeout) {
            Some(client) => {
                info!("found device at {}", candidate.label());
                return Ok(Discovered { candidate, client });
            }
            None => info!("{} is not a compatible device", candidate.label()),
        }
    }

    if total > 0 {
        warn!("no compatible device found; check that the generated firmware is uploaded");
    }
    Err(ClientError::DeviceNotFound { candidates: total })
}

// ============================================================================
// Serial Ports
// ============================================================================

#[cfg(feature = "serial")]
pub use serial::SerialCandidate;

#[cfg(feature = "serial")]
mod serial {
    use super::Candidate;
    use crate::ClientResult;
    use hardsync_contract::Channel;
    use serialport::{SerialPort, SerialPortType};
    use std::time::Duration;

    /// A serial port that may host a device.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SerialCandidate {
        /// OS port name, e.g. `/dev/ttyACM0`.
        pub port_name: String,
        /// USB serial number, when the port is a USB device.
        pub serial_number: Option<String>,
    }

    impl SerialCandidate {
        /// Every serial port currently present.
        pub fn available() -> ClientResult<Vec<Self>> {
            let ports = serialport::available_ports()?;
            Ok(ports
                .into_iter()
                .map(|port| SerialCandidate {
                    serial_number: match port.port_type {
                        SerialPortType::UsbPort(info) => info.serial_number,
                        _ => None,
                    },
                    port_name: port.port_name,
                })
                .collect())
        }
    }

    impl Candidate for SerialCandidate {
        type Transport = Box<dyn SerialPort>;

        fn identifier(&self) -> Option<&str> {
            self.serial_number.as_deref()
        }

        fn label(&self) -> String {
            match &self.serial_number {
                Some(serial) => format!("{} ({})", self.port_name, serial),
                None => self.port_name.clone(),
            }
        }

        fn open(&self, channel: &Channel, timeout: Duration) -> ClientResult<Self::Transport> {
            Ok(serialport::new(&self.port_name, channel.baud_rate().get())
                .timeout(timeout)
                .open()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardsync_contract::{BaudRate, Exchange, FieldSet, FieldValue, SemanticType};
    use std::cell::RefCell;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    #[derive(Debug)]
    struct Port {
        reply: Cursor<Vec<u8>>,
    }

    impl Read for Port {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reply.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
                n => Ok(n),
            }
        }
    }

    impl Write for Port {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Fake {
        name: &'static str,
        serial: Option<&'static str>,
        reply: Option<&'static [u8]>,
        opened: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Candidate for Fake {
        type Transport = Port;

        fn identifier(&self) -> Option<&str> {
            self.serial
        }

        fn label(&self) -> String {
            self.name.to_string()
        }

        fn open(&self, _: &Channel, _: Duration) -> ClientResult<Port> {
            self.opened.borrow_mut().push(self.name);
            match self.reply {
                Some(reply) => Ok(Port {
                    reply: Cursor::new(reply.to_vec()),
                }),
                None => Err(ClientError::Io(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "busy",
                ))),
            }
        }
    }

    struct Bench {
        opened: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Bench {
        fn new() -> Self {
            Bench {
                opened: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn fake(
            &self,
            name: &'static str,
            serial: Option<&'static str>,
            reply: Option<&'static [u8]>,
        ) -> Fake {
            Fake {
                name,
                serial,
                reply,
                opened: Rc::clone(&self.opened),
            }
        }

        fn opened(&self) -> Vec<&'static str> {
            self.opened.borrow().clone()
        }
    }

    fn channel(identifier: &str) -> Channel {
        Channel::new(BaudRate::new(9600).unwrap(), identifier)
    }

    const TIMEOUT: Duration = Duration::from_millis(10);

    #[test]
    fn test_first_answering_candidate_wins() {
        let bench = Bench::new();
        let candidates = vec![
            bench.fake("ttyS0", None, Some(b"")),
            bench.fake("ttyACM0", Some("X1"), Some(b"PingResponse()\n")),
            bench.fake("ttyACM1", Some("X2"), Some(b"PingResponse()\n")),
        ];
        let found = discover(candidates, &channel(""), TIMEOUT).unwrap();
        assert_eq!(found.candidate.name, "ttyACM0");
        assert_eq!(bench.opened(), vec!["ttyS0", "ttyACM0"]);
    }

    #[test]
    fn test_preferred_identifier_tried_first() {
        let bench = Bench::new();
        let candidates = vec![
            bench.fake("ttyACM0", Some("X1"), Some(b"PingResponse()\n")),
            bench.fake("ttyACM1", Some("X2"), Some(b"PingResponse()\n")),
        ];
        let found = discover(candidates, &channel("X2"), TIMEOUT).unwrap();
        assert_eq!(found.candidate.name, "ttyACM1");
        assert_eq!(bench.opened(), vec!["ttyACM1"]);
    }

    #[test]
    fn test_unopenable_candidate_skipped() {
        let bench = Bench::new();
        let candidates = vec![
            bench.fake("busy", None, None),
            bench.fake("ttyACM0", None, Some(b"PingResponse()\n")),
        ];
        let found = discover(candidates, &channel(""), TIMEOUT).unwrap();
        assert_eq!(found.candidate.name, "ttyACM0");
    }

    #[test]
    fn test_retries_past_stale_output() {
        let bench = Bench::new();
        let candidates = vec![bench.fake(
            "ttyACM0",
            None,
            Some(b"boot banner\nPingResponse()\n"),
        )];
        assert!(discover(candidates, &channel(""), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_output_after_ping_kept() {
        let bench = Bench::new();
        let candidates = vec![bench.fake(
            "ttyACM0",
            None,
            Some(b"PingResponse()\nMeasureVoltageResponse(voltage=1.5)\n"),
        )];
        let found = discover(candidates, &channel(""), TIMEOUT).unwrap();
        assert_eq!(
            found.client.buffered_len(),
            "MeasureVoltageResponse(voltage=1.5)\n".len()
        );

        let measure = Exchange::new(
            "MeasureVoltage",
            FieldSet::new().with("channel", SemanticType::Integer),
            FieldSet::new().with("voltage", SemanticType::Float),
        );
        let mut client = found.client.with_exchanges(EncodingKind::Text, [measure]);
        let request = [("channel".to_string(), FieldValue::Integer(1))]
            .into_iter()
            .collect();
        let response = client.request("MeasureVoltage", request).unwrap();
        assert_eq!(response.float("voltage").unwrap(), 1.5);
    }

    #[test]
    fn test_exhaustion() {
        let bench = Bench::new();
        let candidates = vec![
            bench.fake("ttyS0", None, Some(b"")),
            bench.fake("ttyS1", None, Some(b"hello\n")),
        ];
        assert!(matches!(
            discover(candidates, &channel(""), TIMEOUT),
            Err(ClientError::DeviceNotFound { candidates: 2 })
        ));
        assert_eq!(bench.opened(), vec!["ttyS0", "ttyS1"]);
    }

    #[test]
    fn test_no_candidates() {
        assert!(matches!(
            discover(Vec::<Fake>::new(), &channel(""), TIMEOUT),
            Err(ClientError::DeviceNotFound { candidates: 0 })
        ));
    }
}
