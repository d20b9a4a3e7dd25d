//! Error types for the fabric-store crate.

use fabric_core::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Endpoint not found: {node_id}")]
    EndpointNotFound { node_id: NodeId },

    #[error("Federation denied: {from_tenant} -> {to_tenant} requires both endpoints to be federation-eligible")]
    FederationDenied {
        from_tenant: String,
        to_tenant: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
