//! Shared domain types for ignoreguard.
//!
//! Pull-request events, the branch/file policy, existence and outcome values
//! produced by the provisioning workflow, and the error types shared between
//! the core and infrastructure layers.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod outcome;
pub mod policy;
