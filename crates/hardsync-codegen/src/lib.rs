//! Hardsync Code Generators
//!
//! Turns a validated contract into matching sources for both ends of the
//! serial link:
//!
//! - a device-firmware bundle under `firmware/`: `parser.h`, `parser.cpp`,
//!   `client.h`, `client.cpp`, and `firmware.ino`, written in generic C++ and
//!   rewritten into the target dialect;
//! - a host client, `client.rs`, exposing one typed method per exchange.
//!
//! Output depends only on the contract and the dialect, so regenerating from
//! an unchanged contract reproduces byte-identical files.
//!
//! # Example
//!
//! ```rust,ignore
//! use hardsync_codegen::generate;
//! use hardsync_transpiler::Target;
//!
//! let contract = Contract::from_path("contract.yaml")?;
//! for file in generate(&contract, &Target::Arduino.dialect())? {
//!     std::fs::write(out_dir.join(&file.path), &file.contents)?;
//! }
//! ```

mod case;
mod error;
mod firmware;
mod host;
mod output;

pub use case::*;
pub use error::*;
pub use firmware::*;
pub use host::*;
pub use output::{GeneratedFile, FIRMWARE_DIR, HOST_CLIENT_FILE};

use hardsync_contract::Contract;
use hardsync_transpiler::Dialect;

/// Generate the firmware bundle and the host client.
pub fn generate(contract: &Contract, dialect: &Dialect) -> GenerateResult<Vec<GeneratedFile>> {
    let compiled = dialect.compile()?;
    let mut files = FirmwareGenerator::new(contract, &compiled).generate()?;
    files.push(generate_host_client(contract)?);
    log::info!(
        "generated {} file(s) for {} exchange(s) using dialect `{}`",
        files.len(),
        contract.exchanges().len(),
        compiled.name()
    );
    Ok(files)
}
