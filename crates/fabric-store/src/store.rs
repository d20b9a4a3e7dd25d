//! The graph store: arena-plus-index storage for nodes and edges.
//!
//! Nodes and edges live in dense `Vec`s; a `HashMap` from the deterministic
//! identifier to the dense index gives O(1) keyed access. Re-writing an
//! existing key reuses its slot.

use std::collections::HashMap;

use chrono::Utc;
use fabric_core::{
    Edge, EdgeId, EdgeType, EntityType, Node, NodeId, Provenance, ScopeContext, WriteOutcome,
};

use crate::error::{Result, StoreError};
use crate::inference::{match_rule, InferenceRule, INFERENCE_RULES};

/// Outcome of `GraphStore::register`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub node: Node,
    pub outcome: WriteOutcome,
}

/// Outcome of `GraphStore::link`.
#[derive(Debug, Clone)]
pub struct LinkWrite {
    pub edge: Edge,
    pub outcome: WriteOutcome,
}

/// Node and edge records for one tenant/facility scope.
pub struct GraphStore {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeId, usize>,
    rules: Vec<InferenceRule>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Create an empty store using the built-in inference rule table.
    pub fn new() -> Self {
        Self::with_rules(INFERENCE_RULES.to_vec())
    }

    /// Create an empty store with a custom inference rule table.
    pub fn with_rules(rules: Vec<InferenceRule>) -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            rules,
        }
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Register an entity as a node.
    ///
    /// An existing node with the same `(entity_type, entity_id)` key is
    /// replaced in place, not merged: its metadata and creation timestamp
    /// are discarded. Edges touching it take on the new scope and visibility.
    pub fn register(
        &mut self,
        entity_type: EntityType,
        entity_id: &str,
        source: Provenance,
        scope: ScopeContext,
        name: &str,
        metadata: serde_json::Value,
    ) -> Registration {
        let node = Node::new(entity_type, entity_id, source, scope, name, metadata);

        let outcome = match self.node_index.get(&node.id) {
            Some(&idx) => {
                self.nodes[idx] = node.clone();
                self.refresh_edges(&node.id);
                WriteOutcome::Replaced
            }
            None => {
                self.node_index.insert(node.id, self.nodes.len());
                self.nodes.push(node.clone());
                WriteOutcome::Created
            }
        };

        tracing::debug!(
            node_id = %node.id,
            entity_type = %entity_type,
            entity_id,
            outcome = ?outcome,
            "Node registered"
        );

        Registration { node, outcome }
    }

    /// Write a directed edge between two registered nodes.
    ///
    /// A second link with the same `(edge_type, from, to)` overwrites the
    /// first in place.
    pub fn link(
        &mut self,
        from: &NodeId,
        to: &NodeId,
        edge_type: EdgeType,
        rationale: &str,
        actor: &str,
    ) -> Result<LinkWrite> {
        let from_node = self
            .get_node(from)
            .ok_or(StoreError::EndpointNotFound { node_id: *from })?;
        let to_node = self
            .get_node(to)
            .ok_or(StoreError::EndpointNotFound { node_id: *to })?;

        if from_node.tenant_id() != to_node.tenant_id()
            && !(from_node.federation_eligible && to_node.federation_eligible)
        {
            return Err(StoreError::FederationDenied {
                from_tenant: from_node.tenant_id().to_string(),
                to_tenant: to_node.tenant_id().to_string(),
            });
        }

        let edge = Edge::between(from_node, to_node, edge_type, 1.0, rationale, actor);
        let outcome = self.put_edge(edge.clone());

        tracing::debug!(
            edge_id = %edge.id,
            edge_type = %edge_type,
            from = %from,
            to = %to,
            outcome = ?outcome,
            "Edge linked"
        );

        Ok(LinkWrite { edge, outcome })
    }

    /// Infer edges from `node_id` to every other node in the same tenant.
    ///
    /// Each candidate is matched against the rule table with the registered
    /// node as `from`; the first matching rule yields at most one edge for
    /// that pair. Edges whose derived key already exists are left untouched.
    /// Returns only the edges newly written by this call.
    ///
    /// Cost: a full scan of the node arena, so bulk ingestion through
    /// register-then-infer is O(N²) in the number of nodes.
    pub fn infer_links(&mut self, node_id: &NodeId, actor: &str) -> Result<Vec<Edge>> {
        let source = self
            .get_node(node_id)
            .cloned()
            .ok_or(StoreError::EndpointNotFound { node_id: *node_id })?;

        let candidates: Vec<Edge> = self
            .nodes
            .iter()
            .filter(|other| other.id != source.id && other.tenant_id() == source.tenant_id())
            .filter_map(|other| {
                match_rule(&self.rules, source.entity_type, other.entity_type).map(|rule| {
                    Edge::between(
                        &source,
                        other,
                        rule.edge_type,
                        rule.strength,
                        rule.rationale,
                        actor,
                    )
                })
            })
            .collect();

        let mut created = Vec::new();
        for edge in candidates {
            if self.edge_index.contains_key(&edge.id) {
                continue;
            }
            self.put_edge(edge.clone());
            created.push(edge);
        }

        if !created.is_empty() {
            tracing::info!(
                node_id = %node_id,
                inferred = created.len(),
                "Inferred edges for registered node"
            );
        }

        Ok(created)
    }

    /// Recompute derived fields of every edge touching `node_id`.
    fn refresh_edges(&mut self, node_id: &NodeId) {
        let mut refreshed = 0usize;
        for edge in self.edges.iter_mut().filter(|e| e.touches(node_id)) {
            let endpoints = (
                self.node_index.get(&edge.from_id),
                self.node_index.get(&edge.to_id),
            );
            if let (Some(&from), Some(&to)) = endpoints {
                edge.refresh_endpoints(&self.nodes[from], &self.nodes[to]);
                refreshed += 1;
            }
        }

        if refreshed > 0 {
            tracing::debug!(node_id = %node_id, refreshed, "Edges refreshed for replaced node");
        }
    }

    fn put_edge(&mut self, edge: Edge) -> WriteOutcome {
        match self.edge_index.get(&edge.id) {
            Some(&idx) => {
                self.edges[idx] = edge;
                WriteOutcome::Replaced
            }
            None => {
                self.edge_index.insert(edge.id, self.edges.len());
                self.edges.push(edge);
                WriteOutcome::Created
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Look up a node by its natural key.
    pub fn get_node_by_key(&self, entity_type: EntityType, entity_id: &str) -> Option<&Node> {
        self.get_node(&NodeId::derive(entity_type, entity_id))
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_index.get(id).map(|&idx| &self.edges[idx])
    }

    /// All edges with `node` as either endpoint, in insertion order.
    ///
    /// Linear scan over the edge arena; a per-endpoint index would make this
    /// proportional to the node's degree instead.
    pub fn edges_touching(&self, node: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(node)).collect()
    }

    pub fn nodes_by_type(&self, entity_type: EntityType) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.entity_type == entity_type)
            .collect()
    }

    pub fn edges_by_type(&self, edge_type: EdgeType) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.edge_type == edge_type)
            .collect()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Timestamp of the most recent write, if any.
    pub fn last_modified(&self) -> Option<chrono::DateTime<Utc>> {
        let node_max = self.nodes.iter().map(|n| n.updated_at).max();
        let edge_max = self.edges.iter().map(|e| e.created_at).max();
        node_max.max(edge_max)
    }
}
