//! Serial channel declaration.
//!
//! The channel is purely descriptive: it records the baud rate both sides must
//! agree on and an endpoint identifier (typically a device serial number) that
//! the host transport uses to pick a port.

use serde::{Deserialize, Serialize};

/// Standard serial speeds a contract may select.
pub const STANDARD_BAUD_RATES: [u32; 14] = [
    300, 1_200, 2_400, 4_800, 9_600, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800, 921_600,
    1_000_000, 2_000_000,
];

/// Baud rate used when the contract declares no channel.
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

/// A baud rate drawn from [`STANDARD_BAUD_RATES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BaudRate(u32);

impl BaudRate {
    /// Accept `rate` only if it is a standard serial speed.
    pub fn new(rate: u32) -> Option<Self> {
        STANDARD_BAUD_RATES
            .contains(&rate)
            .then_some(BaudRate(rate))
    }

    /// The rate in bits per second.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate(DEFAULT_BAUD_RATE)
    }
}

impl std::fmt::Display for BaudRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared channel as written in a contract, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawChannel {
    /// Requested baud rate.
    pub baud_rate: u32,
    /// Endpoint identifier, e.g. the device serial number.
    #[serde(default)]
    pub identifier: String,
}

impl RawChannel {
    /// Create a raw channel declaration.
    pub fn new(baud_rate: u32, identifier: impl Into<String>) -> Self {
        RawChannel {
            baud_rate,
            identifier: identifier.into(),
        }
    }
}

impl Default for RawChannel {
    fn default() -> Self {
        RawChannel::new(DEFAULT_BAUD_RATE, "")
    }
}

/// A validated channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    baud_rate: BaudRate,
    identifier: String,
}

impl Channel {
    /// Create a channel from a validated baud rate.
    pub fn new(baud_rate: BaudRate, identifier: impl Into<String>) -> Self {
        Channel {
            baud_rate,
            identifier: identifier.into(),
        }
    }

    /// Baud rate.
    pub fn baud_rate(&self) -> BaudRate {
        self.baud_rate
    }

    /// Endpoint identifier; empty when unknown.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}
