//! Logging setup for bbcli.
//!
//! Structured logging goes through the `tracing` crate. Events are written
//! to stderr so command output on stdout stays clean.
//!
//! # Feature Flags
//!
//! - `release-logs`: Strip debug/trace at compile time
//! - `max-perf`: Disable all tracing for maximum performance

mod init;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
