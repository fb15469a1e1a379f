//! Infrastructure layer for ignoreguard.
//!
//! Contains implementations of the port traits defined in `ignoreguard-core`:
//! the GitHub REST client with App authentication, the filesystem template
//! source, plus the webhook admission gate and the policy-file loader.

pub mod admission;
pub mod config;
pub mod github;
pub mod template;
