//! Request and response types for fabric queries.

use std::fmt;
use std::str::FromStr;

use fabric_core::{
    Edge, EdgeId, EdgeType, EntityType, FabricError, Node, NodeId, PolicyEvaluation,
    ScopeContext, Subsystem,
};
use serde::{Deserialize, Serialize};

/// The seven supported query shapes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QueryType {
    NodeById,
    NodesByType,
    EdgesByNode,
    KnowledgeForEntity,
    LineageTrace,
    ImpactAnalysis,
    CrossEngineSearch,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeById => "node-by-id",
            Self::NodesByType => "nodes-by-type",
            Self::EdgesByNode => "edges-by-node",
            Self::KnowledgeForEntity => "knowledge-for-entity",
            Self::LineageTrace => "lineage-trace",
            Self::ImpactAnalysis => "impact-analysis",
            Self::CrossEngineSearch => "cross-engine-search",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node-by-id" => Ok(Self::NodeById),
            "nodes-by-type" => Ok(Self::NodesByType),
            "edges-by-node" => Ok(Self::EdgesByNode),
            "knowledge-for-entity" => Ok(Self::KnowledgeForEntity),
            "lineage-trace" => Ok(Self::LineageTrace),
            "impact-analysis" => Ok(Self::ImpactAnalysis),
            "cross-engine-search" => Ok(Self::CrossEngineSearch),
            other => Err(FabricError::UnknownQueryType(other.to_string())),
        }
    }
}

/// Optional filters; which ones apply depends on the query shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Start entity. Combined with `entity_type` it derives the node ID;
    /// on its own it matches the first node with that entity ID.
    pub entity_id: Option<String>,
    pub entity_type: Option<EntityType>,
    pub source_subsystem: Option<Subsystem>,
    /// Restricts the edges collected or walked (not applied to lineage/impact).
    pub edge_type: Option<EdgeType>,
    /// Edges weaker than this are ignored.
    pub min_strength: Option<f64>,
    /// Overrides the shape's default depth limit.
    pub max_depth: Option<usize>,
}

impl QueryFilters {
    pub fn for_entity(entity_type: EntityType, entity_id: &str) -> Self {
        Self {
            entity_id: Some(entity_id.to_string()),
            entity_type: Some(entity_type),
            ..Default::default()
        }
    }
}

/// A parsed, typed query.
#[derive(Debug, Clone)]
pub struct FabricQuery {
    pub query_type: QueryType,
    pub scope: ScopeContext,
    pub filters: QueryFilters,
    pub max_results: Option<usize>,
}

impl FabricQuery {
    pub fn new(query_type: QueryType, scope: ScopeContext, filters: QueryFilters) -> Self {
        Self {
            query_type,
            scope,
            filters,
            max_results: None,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// A query as callers submit it, with the query type still a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_type: String,
    pub scope: ScopeContext,
    #[serde(default)]
    pub filters: QueryFilters,
    pub max_results: Option<usize>,
}

impl QueryRequest {
    /// Parse the query type. Fails with `UnknownQueryType` for unrecognized names.
    pub fn parse(&self) -> fabric_core::Result<FabricQuery> {
        Ok(FabricQuery {
            query_type: self.query_type.parse()?,
            scope: self.scope.clone(),
            filters: self.filters.clone(),
            max_results: self.max_results,
        })
    }
}

/// A node discovered during a traversal, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrossReference {
    pub node_id: NodeId,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub subsystem: Subsystem,
    /// Hops from the start node.
    pub depth: usize,
    pub via_edge: EdgeId,
    pub relationship: EdgeType,
}

/// Raw output of a query shape before it is wrapped into a `QueryResult`.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub references: Vec<CrossReference>,
}

/// The response handed back to query callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_type: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub execution_time_ms: u64,
    pub references: Vec<CrossReference>,
    pub evaluations: Vec<PolicyEvaluation>,
    /// Set when policy refused the query; the result is then empty.
    pub denied: bool,
}

impl QueryResult {
    pub fn from_resolution(
        query_type: QueryType,
        resolution: Resolution,
        execution_time_ms: u64,
        evaluations: Vec<PolicyEvaluation>,
    ) -> Self {
        Self {
            query_type: query_type.to_string(),
            total_nodes: resolution.nodes.len(),
            total_edges: resolution.edges.len(),
            nodes: resolution.nodes,
            edges: resolution.edges,
            execution_time_ms,
            references: resolution.references,
            evaluations,
            denied: false,
        }
    }

    /// An empty, zero-count result tagged as denied.
    pub fn denied(query_type: QueryType, evaluation: PolicyEvaluation) -> Self {
        Self {
            query_type: query_type.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            total_nodes: 0,
            total_edges: 0,
            execution_time_ms: 0,
            references: Vec::new(),
            evaluations: vec![evaluation],
            denied: true,
        }
    }
}
