//! fabric-mesh: the policy-gated orchestrator for the data fabric.
//!
//! Producer subsystems register entities and request links; consumers run
//! queries. Every write and read is evaluated against the policy table
//! first, delegated to the graph store or query resolver on success, and
//! recorded in an audit sink. `FabricRegistry` owns one `DataFabric` per
//! (tenant, facility) pairing.

pub mod fabric;
pub mod ops;
pub mod registry;
pub mod types;
pub mod validation;

pub use fabric::DataFabric;
pub use registry::{FabricKey, FabricRegistry};
pub use types::{EntityRegistration, FabricStatistics, LinkRequest, LinkResult, RegisterRequest};
pub use validation::validate_link_request;
