//! Core domain types for the data fabric knowledge mesh.
//!
//! Nodes are projections of entities owned by producer subsystems; edges are
//! typed, directed relationships between them. Both carry identifiers derived
//! purely from their natural keys so that re-deriving always lands on the
//! same slot.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scope::{ScopeContext, Visibility};

/// Namespace UUID for deterministic node and edge IDs.
const FABRIC_NS: Uuid = Uuid::from_bytes([
    0x3f, 0x1c, 0x92, 0x4e, 0x5b, 0x07, 0x4d, 0x2a, 0x9e, 0x61, 0xc4, 0x08, 0x7d, 0xb3, 0x15, 0xa9,
]);

// ── Identifiers ───────────────────────────────────────────────────

/// Unique identifier for any node in the fabric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Derive the node ID for an `(entity_type, entity_id)` pair.
    pub fn derive(entity_type: EntityType, entity_id: &str) -> Self {
        Self(Uuid::new_v5(
            &FABRIC_NS,
            format!("{}:{}", entity_type.as_str(), entity_id).as_bytes(),
        ))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an edge in the fabric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Derive the edge ID for an `(edge_type, from, to)` tuple.
    pub fn derive(edge_type: EdgeType, from: &NodeId, to: &NodeId) -> Self {
        Self(Uuid::new_v5(
            &FABRIC_NS,
            format!("{}:{}:{}", edge_type.as_str(), from.0, to.0).as_bytes(),
        ))
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Subsystems ────────────────────────────────────────────────────

/// The producer subsystem that owns an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Subsystem {
    Training,
    Insights,
    Health,
    Governance,
    Timeline,
    Analytics,
    KnowledgeGraph,
    Marketplace,
}

impl Subsystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Insights => "insights",
            Self::Health => "health",
            Self::Governance => "governance",
            Self::Timeline => "timeline",
            Self::Analytics => "analytics",
            Self::KnowledgeGraph => "knowledge-graph",
            Self::Marketplace => "marketplace",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node came from: the owning subsystem and its rollout phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub subsystem: Subsystem,
    pub phase: u32,
}

impl Provenance {
    pub fn new(subsystem: Subsystem, phase: u32) -> Self {
        Self { subsystem, phase }
    }
}

// ── Entity Types ──────────────────────────────────────────────────

/// The closed set of entity kinds that can be projected into the fabric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    // Training
    TrainingModule,
    TrainingCourse,
    Certification,
    SkillAssessment,
    // Insights
    Insight,
    Recommendation,
    Anomaly,
    Forecast,
    // Health
    HealthCheck,
    Alert,
    Incident,
    SensorReading,
    // Governance
    GovernancePolicy,
    Permission,
    Approval,
    ComplianceRecord,
    // Timeline
    TimelineEvent,
    Milestone,
    Schedule,
    // Analytics
    Metric,
    Report,
    Dashboard,
    Kpi,
    // Knowledge graph
    KgNode,
    KgRelation,
    KnowledgePack,
    // Marketplace
    Listing,
    Vendor,
    Asset,
    PurchaseOrder,
}

impl EntityType {
    pub const ALL: [EntityType; 30] = [
        Self::TrainingModule,
        Self::TrainingCourse,
        Self::Certification,
        Self::SkillAssessment,
        Self::Insight,
        Self::Recommendation,
        Self::Anomaly,
        Self::Forecast,
        Self::HealthCheck,
        Self::Alert,
        Self::Incident,
        Self::SensorReading,
        Self::GovernancePolicy,
        Self::Permission,
        Self::Approval,
        Self::ComplianceRecord,
        Self::TimelineEvent,
        Self::Milestone,
        Self::Schedule,
        Self::Metric,
        Self::Report,
        Self::Dashboard,
        Self::Kpi,
        Self::KgNode,
        Self::KgRelation,
        Self::KnowledgePack,
        Self::Listing,
        Self::Vendor,
        Self::Asset,
        Self::PurchaseOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrainingModule => "training-module",
            Self::TrainingCourse => "training-course",
            Self::Certification => "certification",
            Self::SkillAssessment => "skill-assessment",
            Self::Insight => "insight",
            Self::Recommendation => "recommendation",
            Self::Anomaly => "anomaly",
            Self::Forecast => "forecast",
            Self::HealthCheck => "health-check",
            Self::Alert => "alert",
            Self::Incident => "incident",
            Self::SensorReading => "sensor-reading",
            Self::GovernancePolicy => "governance-policy",
            Self::Permission => "permission",
            Self::Approval => "approval",
            Self::ComplianceRecord => "compliance-record",
            Self::TimelineEvent => "timeline-event",
            Self::Milestone => "milestone",
            Self::Schedule => "schedule",
            Self::Metric => "metric",
            Self::Report => "report",
            Self::Dashboard => "dashboard",
            Self::Kpi => "kpi",
            Self::KgNode => "kg-node",
            Self::KgRelation => "kg-relation",
            Self::KnowledgePack => "knowledge-pack",
            Self::Listing => "listing",
            Self::Vendor => "vendor",
            Self::Asset => "asset",
            Self::PurchaseOrder => "purchase-order",
        }
    }

    /// The subsystem that owns entities of this type.
    pub fn subsystem(&self) -> Subsystem {
        match self {
            Self::TrainingModule
            | Self::TrainingCourse
            | Self::Certification
            | Self::SkillAssessment => Subsystem::Training,
            Self::Insight | Self::Recommendation | Self::Anomaly | Self::Forecast => {
                Subsystem::Insights
            }
            Self::HealthCheck | Self::Alert | Self::Incident | Self::SensorReading => {
                Subsystem::Health
            }
            Self::GovernancePolicy
            | Self::Permission
            | Self::Approval
            | Self::ComplianceRecord => Subsystem::Governance,
            Self::TimelineEvent | Self::Milestone | Self::Schedule => Subsystem::Timeline,
            Self::Metric | Self::Report | Self::Dashboard | Self::Kpi => Subsystem::Analytics,
            Self::KgNode | Self::KgRelation | Self::KnowledgePack => Subsystem::KnowledgeGraph,
            Self::Listing | Self::Vendor | Self::Asset | Self::PurchaseOrder => {
                Subsystem::Marketplace
            }
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Edge Types ────────────────────────────────────────────────────

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    References,
    DerivedFrom,
    IsSourcedFrom,
    Affects,
    Triggers,
    DependsOn,
    RelatedTo,
    Supersedes,
    Contains,
    Validates,
}

impl EdgeType {
    pub const ALL: [EdgeType; 10] = [
        Self::References,
        Self::DerivedFrom,
        Self::IsSourcedFrom,
        Self::Affects,
        Self::Triggers,
        Self::DependsOn,
        Self::RelatedTo,
        Self::Supersedes,
        Self::Contains,
        Self::Validates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::References => "references",
            Self::DerivedFrom => "derived-from",
            Self::IsSourcedFrom => "is-sourced-from",
            Self::Affects => "affects",
            Self::Triggers => "triggers",
            Self::DependsOn => "depends-on",
            Self::RelatedTo => "related-to",
            Self::Supersedes => "supersedes",
            Self::Contains => "contains",
            Self::Validates => "validates",
        }
    }

    /// Relationship strength (0.0–1.0) assigned to auto-generated edges.
    pub fn strength(&self) -> f64 {
        match self {
            Self::References => 0.8,
            Self::DerivedFrom => 0.9,
            Self::IsSourcedFrom => 0.85,
            Self::Affects => 0.7,
            Self::Triggers => 0.75,
            Self::DependsOn => 0.8,
            Self::RelatedTo => 0.5,
            Self::Supersedes => 0.95,
            Self::Contains => 0.9,
            Self::Validates => 0.85,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Records ───────────────────────────────────────────────────────

/// A fabric-visible projection of an entity owned by a producer subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub source: Provenance,
    pub scope: ScopeContext,
    pub name: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visibility: Visibility,
    /// True only for global- or tenant-tier scopes.
    pub federation_eligible: bool,
}

impl Node {
    pub fn new(
        entity_type: EntityType,
        entity_id: &str,
        source: Provenance,
        scope: ScopeContext,
        name: &str,
        metadata: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::derive(entity_type, entity_id),
            entity_type,
            entity_id: entity_id.to_string(),
            source,
            visibility: scope.visibility(),
            federation_eligible: scope.federation_eligible(),
            scope,
            name: name.to_string(),
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.scope.tenant_id
    }
}

/// A typed, directed relationship between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub edge_type: EdgeType,
    pub from_id: NodeId,
    pub to_id: NodeId,
    pub from_type: EntityType,
    pub to_type: EntityType,
    pub strength: f64,
    pub rationale: String,
    /// Merge of both endpoint scopes.
    pub scope: ScopeContext,
    /// The more restrictive of both endpoint visibilities.
    pub visibility: Visibility,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Build an edge between two nodes, inheriting the stricter scope and visibility.
    pub fn between(
        from: &Node,
        to: &Node,
        edge_type: EdgeType,
        strength: f64,
        rationale: &str,
        created_by: &str,
    ) -> Self {
        Self {
            id: EdgeId::derive(edge_type, &from.id, &to.id),
            edge_type,
            from_id: from.id,
            to_id: to.id,
            from_type: from.entity_type,
            to_type: to.entity_type,
            strength: strength.clamp(0.0, 1.0),
            rationale: rationale.to_string(),
            scope: from.scope.merge(&to.scope),
            visibility: from.visibility.max(to.visibility),
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Re-derive endpoint types, scope, and visibility after an endpoint
    /// node was replaced. Identity, strength, rationale, and creator stay.
    pub fn refresh_endpoints(&mut self, from: &Node, to: &Node) {
        self.from_type = from.entity_type;
        self.to_type = to.entity_type;
        self.scope = from.scope.merge(&to.scope);
        self.visibility = from.visibility.max(to.visibility);
    }

    /// The endpoint opposite `node`, if `node` is one of this edge's endpoints.
    pub fn other_end(&self, node: &NodeId) -> Option<NodeId> {
        if &self.from_id == node {
            Some(self.to_id)
        } else if &self.to_id == node {
            Some(self.from_id)
        } else {
            None
        }
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.from_id == node || &self.to_id == node
    }
}

/// What a write did to the slot its key maps to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The key was new.
    Created,
    /// An existing record at the key was overwritten in place.
    Replaced,
}
