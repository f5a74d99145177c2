//! Logging setup for drivers.
//!
//! The library itself only talks to the `log` facade; a driver calls
//! [`init_logging`] once to route records through `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
