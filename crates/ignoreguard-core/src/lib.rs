//! Provisioning workflow and port definitions for ignoreguard.
//!
//! This crate defines the "ports" (the version-control and template traits)
//! that the infrastructure layer implements, plus the workflow that drives
//! them. It depends only on `ignoreguard-types` -- never on
//! `ignoreguard-infra` or any HTTP/IO crate.

pub mod provision;
pub mod repository;
