//! Common types, traits, and utilities shared across the crate.

// Submodule declarations
pub mod error;
pub mod metadata;
pub mod xml;

// Re-exports for convenience
pub use error::{BoxError, Error, ErrorKind, Result};
pub use metadata::Metadata;
