//! Audit event types emitted by the fabric orchestrator.
//!
//! Events are handed to an audit sink (see `fabric-audit`); the sink decides
//! how, or whether, they are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{EdgeId, EdgeType, EntityType, NodeId, WriteOutcome};

/// Unique identifier for an audit event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct AuditEventId(pub Uuid);

impl AuditEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuditEventId {
    fn default() -> Self {
        Self::new()
    }
}

/// An audit record for one orchestrator operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub tenant_id: String,
    pub actor: String,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
}

impl AuditEvent {
    pub fn new(tenant_id: &str, actor: &str, action: AuditAction) -> Self {
        Self {
            id: AuditEventId::new(),
            tenant_id: tenant_id.to_string(),
            actor: actor.to_string(),
            timestamp: Utc::now(),
            action,
        }
    }

    /// Whether this event records a query, executed or denied.
    pub fn is_query(&self) -> bool {
        matches!(
            self.action,
            AuditAction::QueryExecuted { .. } | AuditAction::QueryDenied { .. }
        )
    }

    pub fn succeeded(&self) -> bool {
        !matches!(
            self.action,
            AuditAction::LinkDenied { .. } | AuditAction::QueryDenied { .. }
        )
    }
}

/// What happened, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum AuditAction {
    /// A producer registered (or re-registered) an entity.
    EntityRegistered {
        node_id: NodeId,
        entity_type: EntityType,
        entity_id: String,
        outcome: WriteOutcome,
        inferred_edges: u32,
    },
    /// A link request passed policy and was written.
    LinkCreated {
        edge_id: EdgeId,
        edge_type: EdgeType,
        from_id: NodeId,
        to_id: NodeId,
        outcome: WriteOutcome,
    },
    /// A link request was refused.
    LinkDenied {
        from_entity_id: String,
        to_entity_id: String,
        edge_type: EdgeType,
        reason: String,
    },
    /// A query was resolved.
    QueryExecuted {
        query_type: String,
        node_count: u32,
        edge_count: u32,
        execution_ms: u64,
    },
    /// A query was refused by policy.
    QueryDenied { query_type: String, reason: String },
}
