//! Logging setup shared by the ignoreguard binary.

pub mod tracing_setup;
