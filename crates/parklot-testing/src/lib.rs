//! Test utilities for Parklot services.
//!
//! Provides `MockSession` for forging authenticated requests and small
//! request/response helpers for driving a router with `tower::ServiceExt`.
//! Import in tests only, never in production code.

pub mod request;
pub mod session;
