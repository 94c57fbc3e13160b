//! Shared primitives: error taxonomy, frames and variants.

/// Captured frames and job variants.
pub mod core;
/// Crate-wide error type.
pub mod error;
