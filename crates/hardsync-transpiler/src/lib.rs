//! Hardsync Template Transpiler
//!
//! A small text-rewriting engine with two independent capabilities:
//!
//! - **Placeholder substitution**: [`populate_template`] replaces every
//!   `{{name}}` marker with its replacement text, failing loudly on any
//!   unresolved marker.
//! - **Pattern rewriting**: a [`RewriteRule`] pairs a match template with a
//!   replacement template. Literal text matches verbatim and each marker
//!   captures one expression. A [`Dialect`] is an ordered list of rules;
//!   [`Target::Arduino`] turns generic C++ into Arduino C++ and
//!   [`Target::Cpp`] leaves text untouched.
//!
//! The engine knows nothing about contracts: it operates on plain text.
//!
//! # Example
//!
//! ```rust
//! use hardsync_transpiler::Target;
//!
//! let arduino = Target::Arduino.dialect().compile()?;
//! assert_eq!(
//!     arduino.transpile("string.substr(start, count)")?,
//!     "string.substring(start, start + count)"
//! );
//! # Ok::<(), hardsync_transpiler::TranspileError>(())
//! ```

mod dialect;
mod error;
mod rule;
mod template;

pub use dialect::*;
pub use error::*;
pub use rule::*;
pub use template::*;
