//! Hardsync Contract Model
//!
//! A contract declares, once, every exchange a host and an embedded device
//! can perform over a serial link. Code generators and both wire encodings
//! consume the validated [`Contract`].
//!
//! # Lifecycle
//!
//! 1. Declarations are collected into a neutral [`RawContract`], either
//!    deserialized from YAML/JSON or built with the typed builder methods.
//! 2. [`Contract::load`] fills in the system defaults for whichever of the
//!    encoding, channel, and type mapping were omitted.
//! 3. The completed contract is validated once. Every violation found is
//!    reported together in a [`ContractError`].
//! 4. The resulting [`Contract`] is immutable.
//!
//! # Example
//!
//! ```rust
//! use hardsync_contract::{Contract, RawContract, RawExchange, SemanticType};
//!
//! let raw = RawContract::new().exchange(
//!     RawExchange::new("MeasureVoltage")
//!         .request_field("integration_time", SemanticType::Float)
//!         .request_field("channel", SemanticType::Integer)
//!         .response_field("voltage", SemanticType::Float),
//! );
//! let contract = Contract::load(raw)?;
//! assert_eq!(contract.channel().baud_rate().get(), 9600);
//! # Ok::<(), hardsync_contract::ContractError>(())
//! ```

mod channel;
mod contract;
mod error;
mod mapping;
mod raw;
mod types;

pub use channel::*;
pub use contract::*;
pub use error::*;
pub use mapping::*;
pub use raw::*;
pub use types::*;
