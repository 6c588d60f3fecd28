//! Logger setup for binaries and tests built on this crate.
//!
//! The library itself only logs through the `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
