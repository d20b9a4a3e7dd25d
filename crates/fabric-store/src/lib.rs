//! fabric-store: the graph store behind the data fabric.
//!
//! Owns node and edge records for a tenant/facility scope in dense arenas
//! keyed by deterministic identifiers, and infers edges for newly registered
//! nodes from an ordered rule table.

pub mod error;
pub mod inference;
pub mod store;

pub use error::StoreError;
pub use inference::{InferenceRule, INFERENCE_RULES};
pub use store::{GraphStore, LinkWrite, Registration};
