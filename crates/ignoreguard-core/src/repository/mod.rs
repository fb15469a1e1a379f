//! Port definitions.
//!
//! These traits define the external interfaces the infrastructure layer
//! (ignoreguard-infra) implements. The core crate never depends on a specific
//! HTTP client or filesystem.

pub mod template;
pub mod vcs;
