//! Logging setup for studymate binaries.
//!
//! Thin wrapper over `tracing-subscriber`: human-readable output for
//! interactive use, JSON lines for log shippers. Library crates only emit
//! `tracing` events; installing a subscriber is the binary's job.

pub mod logging;

pub use logging::{init_logging, init_logging_json};
