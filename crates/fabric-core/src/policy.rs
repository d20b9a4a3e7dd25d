//! Policy records and evaluation results.
//!
//! Policies are plain data; the evaluator in `fabric-policy` interprets them.
//! `default_policies` is the seed table used when no configuration overrides it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope::{ScopeTier, Visibility};
use crate::types::{EdgeType, EntityType};

/// Lookup name of the policy that denies cross-tenant access by default.
pub const TENANT_ISOLATION: &str = "tenant-isolation";
/// Lookup name of the policy that sanctions cross-tenant sharing.
pub const FEDERATION_POLICY: &str = "federation-policy";
/// Lookup name of the edge-type allow-list policy.
pub const EDGE_TYPE_POLICY: &str = "edge-type-policy";
/// Lookup name of the policy that gates queries.
pub const QUERY_POLICY: &str = "query-policy";

/// A scope/tenant policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub scope_tier: ScopeTier,
    #[serde(default)]
    pub allowed_entity_types: Vec<EntityType>,
    #[serde(default)]
    pub allowed_edge_types: Vec<EdgeType>,
    #[serde(default)]
    pub tenant_isolation: bool,
    #[serde(default)]
    pub federation_allowed: bool,
    #[serde(default)]
    pub cross_tenant_links: bool,
    pub default_visibility: Visibility,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Policy {
    pub fn allows_edge_type(&self, edge_type: EdgeType) -> bool {
        self.allowed_edge_types.contains(&edge_type)
    }

    pub fn allows_entity_type(&self, entity_type: EntityType) -> bool {
        self.allowed_entity_types.contains(&entity_type)
    }
}

/// The outcome of a single policy check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyEvaluation {
    pub policy_id: String,
    pub policy_name: String,
    pub allowed: bool,
    pub reason: String,
    pub evaluated_at: DateTime<Utc>,
}

impl PolicyEvaluation {
    pub fn allow(policy_id: &str, policy_name: &str, reason: impl Into<String>) -> Self {
        Self::new(policy_id, policy_name, true, reason)
    }

    pub fn deny(policy_id: &str, policy_name: &str, reason: impl Into<String>) -> Self {
        Self::new(policy_id, policy_name, false, reason)
    }

    fn new(policy_id: &str, policy_name: &str, allowed: bool, reason: impl Into<String>) -> Self {
        Self {
            policy_id: policy_id.to_string(),
            policy_name: policy_name.to_string(),
            allowed,
            reason: reason.into(),
            evaluated_at: Utc::now(),
        }
    }
}

/// The four policies every evaluator starts with.
pub fn default_policies() -> Vec<Policy> {
    vec![
        Policy {
            id: "pol-tenant-isolation".to_string(),
            name: TENANT_ISOLATION.to_string(),
            scope_tier: ScopeTier::Tenant,
            allowed_entity_types: EntityType::ALL.to_vec(),
            allowed_edge_types: EdgeType::ALL.to_vec(),
            tenant_isolation: true,
            federation_allowed: false,
            cross_tenant_links: false,
            default_visibility: Visibility::Tenant,
            active: true,
        },
        Policy {
            id: "pol-federation".to_string(),
            name: FEDERATION_POLICY.to_string(),
            scope_tier: ScopeTier::Global,
            allowed_entity_types: vec![
                EntityType::TrainingModule,
                EntityType::TrainingCourse,
                EntityType::Certification,
                EntityType::Insight,
                EntityType::Recommendation,
                EntityType::Report,
                EntityType::KgNode,
                EntityType::KnowledgePack,
                EntityType::Listing,
                EntityType::Vendor,
            ],
            allowed_edge_types: vec![
                EdgeType::References,
                EdgeType::DerivedFrom,
                EdgeType::RelatedTo,
            ],
            tenant_isolation: false,
            federation_allowed: true,
            cross_tenant_links: true,
            default_visibility: Visibility::Public,
            active: true,
        },
        Policy {
            id: "pol-edge-types".to_string(),
            name: EDGE_TYPE_POLICY.to_string(),
            scope_tier: ScopeTier::Tenant,
            allowed_entity_types: Vec::new(),
            allowed_edge_types: EdgeType::ALL.to_vec(),
            tenant_isolation: true,
            federation_allowed: false,
            cross_tenant_links: false,
            default_visibility: Visibility::Tenant,
            active: true,
        },
        Policy {
            id: "pol-query".to_string(),
            name: QUERY_POLICY.to_string(),
            scope_tier: ScopeTier::Tenant,
            allowed_entity_types: EntityType::ALL.to_vec(),
            allowed_edge_types: EdgeType::ALL.to_vec(),
            tenant_isolation: true,
            federation_allowed: false,
            cross_tenant_links: false,
            default_visibility: Visibility::Tenant,
            active: true,
        },
    ]
}
