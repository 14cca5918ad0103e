//! Service plumbing shared by Parklot binaries: configuration loading,
//! tracing setup, request ids, health probes and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
