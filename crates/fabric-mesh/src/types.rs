//! Request and response types for orchestrator operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fabric_core::{
    Edge, EdgeType, EntityType, Node, PolicyEvaluation, ScopeContext, Subsystem, WriteOutcome,
};
use serde::{Deserialize, Serialize};

/// Request to project an entity into the fabric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub source_subsystem: Subsystem,
    #[serde(default)]
    pub source_phase: u32,
    pub name: String,
    pub scope: ScopeContext,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Result of registering an entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRegistration {
    pub node: Node,
    /// `Created` for a new key, `Replaced` when an earlier record was overwritten.
    pub outcome: WriteOutcome,
    /// Edges inferred for this node by the registration.
    pub inferred: Vec<Edge>,
}

/// Request to link two registered entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRequest {
    pub from_entity_id: String,
    pub from_type: EntityType,
    pub to_entity_id: String,
    pub to_type: EntityType,
    pub edge_type: EdgeType,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub actor: String,
}

/// Structured outcome of a link request.
#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    pub success: bool,
    pub edge: Option<Edge>,
    pub error: Option<String>,
    pub evaluations: Vec<PolicyEvaluation>,
    /// `Created` for a new edge key, `Replaced` when a duplicate request collapsed onto it.
    pub outcome: Option<WriteOutcome>,
}

impl LinkResult {
    pub fn created(edge: Edge, outcome: WriteOutcome, evaluations: Vec<PolicyEvaluation>) -> Self {
        Self {
            success: true,
            edge: Some(edge),
            error: None,
            evaluations,
            outcome: Some(outcome),
        }
    }

    pub fn failed(error: impl Into<String>, evaluations: Vec<PolicyEvaluation>) -> Self {
        Self {
            success: false,
            edge: None,
            error: Some(error.into()),
            evaluations,
            outcome: None,
        }
    }
}

/// Aggregate counts over one fabric.
#[derive(Debug, Clone, Serialize)]
pub struct FabricStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub nodes_by_type: BTreeMap<EntityType, usize>,
    pub nodes_by_subsystem: BTreeMap<Subsystem, usize>,
    pub edges_by_type: BTreeMap<EdgeType, usize>,
    pub federation_eligible_nodes: usize,
    /// Count of every query audit event ever recorded; not time-windowed.
    pub queries_last_24h: usize,
    pub last_updated: Option<DateTime<Utc>>,
}
