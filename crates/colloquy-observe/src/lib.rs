//! Observability utilities for Colloquy.
//!
//! Maps CLI verbosity to a tracing filter and installs the subscriber,
//! optionally bridging spans to OpenTelemetry.

pub mod telemetry;

pub use telemetry::{filter_directive, init_tracing, shutdown_tracing};
