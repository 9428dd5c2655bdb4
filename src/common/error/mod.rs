//! Unified error types for Longan.
//!
//! This module provides a single error type for package assembly, part
//! generation, media access and package inspection, presenting a consistent
//! API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{BoxError, Error, ErrorKind, Result};
