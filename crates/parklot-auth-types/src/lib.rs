//! Session and authorization types shared across Parklot crates.
//!
//! Provides session-token issuing/validation, the session cookie builders, the
//! request-scoped `Identity` with its authentication middleware, and the
//! role guard applied to route groups.

pub mod cookie;
pub mod guard;
pub mod identity;
pub mod token;
