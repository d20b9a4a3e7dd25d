//! fabric-core: Shared types, configuration, and error handling for the data fabric.
//!
//! This crate provides the foundational types used across all fabric components:
//! - Entity types and owning subsystems for graph nodes
//! - Edge types (References, DerivedFrom, etc.) for graph relationships
//! - Scope contexts and visibility tiers for tenant isolation
//! - Policy records and evaluation results
//! - Audit event types
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod policy;
pub mod scope;
pub mod types;

pub use config::FabricConfig;
pub use error::{FabricError, Result};
pub use policy::{Policy, PolicyEvaluation};
pub use scope::{ScopeContext, ScopeTier, Visibility};
pub use types::{
    Edge, EdgeId, EdgeType, EntityType, Node, NodeId, Provenance, Subsystem, WriteOutcome,
};
