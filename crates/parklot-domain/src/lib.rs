//! Domain types shared across all Parklot crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod cost;
pub mod spot;
pub mod user;
