//! Batch operations: the JSON surface driven by the `fabric-mesh apply`
//! command.
//!
//! Each operation names the fabric instance it targets. Register and query
//! operations may omit it, in which case the tenant-wide fabric for the
//! request's scope is used.

use fabric_query::{QueryRequest, QueryResult};
use serde::{Deserialize, Serialize};

use crate::registry::{FabricKey, FabricRegistry};
use crate::types::{EntityRegistration, FabricStatistics, LinkRequest, LinkResult, RegisterRequest};

/// One orchestrator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Register {
        #[serde(default)]
        fabric: Option<FabricKey>,
        request: RegisterRequest,
    },
    Link {
        fabric: FabricKey,
        request: LinkRequest,
    },
    Query {
        #[serde(default)]
        fabric: Option<FabricKey>,
        request: QueryRequest,
    },
    Stats {
        fabric: FabricKey,
    },
}

/// Result of applying one `Operation`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationOutcome {
    Register { result: EntityRegistration },
    Link { result: LinkResult },
    Query { result: QueryResult },
    Stats { result: FabricStatistics },
    Error { message: String },
}

/// Apply `op` against the registry, creating the target fabric if needed.
pub fn apply(registry: &mut FabricRegistry, op: Operation) -> OperationOutcome {
    match op {
        Operation::Register { fabric, request } => {
            let key = fabric.unwrap_or_else(|| FabricKey::for_scope(&request.scope));
            let result = registry.get_or_create(&key).register_entity(request);
            OperationOutcome::Register { result }
        }
        Operation::Link { fabric, request } => {
            let result = registry.get_or_create(&fabric).create_link(&request);
            OperationOutcome::Link { result }
        }
        Operation::Query { fabric, request } => {
            let key = fabric.unwrap_or_else(|| FabricKey::for_scope(&request.scope));
            match registry.get_or_create(&key).execute_query(&request) {
                Ok(result) => OperationOutcome::Query { result },
                Err(e) => OperationOutcome::Error {
                    message: e.to_string(),
                },
            }
        }
        Operation::Stats { fabric } => match registry.get(&fabric) {
            Some(instance) => OperationOutcome::Stats {
                result: instance.get_statistics(),
            },
            None => OperationOutcome::Error {
                message: format!("No fabric for tenant {}", fabric.tenant_id),
            },
        },
    }
}
