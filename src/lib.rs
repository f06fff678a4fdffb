//! Lotcost Core - domain entities, services, and traits.
//!
//! This crate contains the cost-aggregation and quotation logic for an
//! industrial production lot. It is storage-agnostic: the embedding
//! application persists sheets by implementing the snapshot repository
//! trait.

pub mod constants;
pub mod costsheet;
pub mod errors;
pub mod fx;
pub mod settings;
pub mod snapshot;
pub mod valuation;

// Re-export common types from the costsheet and valuation modules
pub use costsheet::*;
pub use valuation::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
