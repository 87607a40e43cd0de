//! qp-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for all other qp-* crates,
//! providing type-safe identifiers, a unified error type, the blog domain
//! enums (roles, categories, media references) and application configuration.

pub mod config;
pub mod domain;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use domain::*;
pub use error::{Error, Result};
pub use ids::*;
