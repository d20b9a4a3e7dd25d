//! The query resolver: dispatches a `FabricQuery` to its shape, then applies
//! scope filtering and the result cap.

use std::collections::HashSet;

use fabric_core::config::QueryConfig;
use fabric_core::{Edge, EdgeId, EdgeType, Node, NodeId};
use fabric_store::GraphStore;

use crate::filter::apply_scope;
use crate::traversal::{breadth_first, Direction};
use crate::types::{FabricQuery, QueryFilters, QueryType, Resolution};

/// Edge types followed by lineage traces.
const LINEAGE_EDGE_TYPES: &[EdgeType] = &[EdgeType::DerivedFrom, EdgeType::IsSourcedFrom];

/// Edge types followed by impact analysis.
const IMPACT_EDGE_TYPES: &[EdgeType] = &[EdgeType::Affects, EdgeType::Triggers];

/// Read-only resolver over a borrowed store.
pub struct QueryResolver<'a> {
    store: &'a GraphStore,
    config: QueryConfig,
}

impl<'a> QueryResolver<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    pub fn with_config(store: &'a GraphStore, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Resolve a query: shape-specific resolution, then scope filtering, then
    /// the node cap. The cap truncates nodes only; edges are left whole.
    pub fn resolve(&self, query: &FabricQuery) -> Resolution {
        let filters = &query.filters;
        let mut resolution = match query.query_type {
            QueryType::NodeById => self.node_by_id(filters),
            QueryType::NodesByType => self.nodes_by_type(filters),
            QueryType::EdgesByNode => self.edges_by_node(filters),
            QueryType::KnowledgeForEntity => self.knowledge_for_entity(filters),
            QueryType::LineageTrace => self.lineage_trace(filters),
            QueryType::ImpactAnalysis => self.impact_analysis(filters),
            QueryType::CrossEngineSearch => self.cross_engine_search(filters),
        };

        apply_scope(&mut resolution, &query.scope);

        if let Some(cap) = query.max_results.or(self.config.default_max_results) {
            resolution.nodes.truncate(cap);
        }

        tracing::debug!(
            query_type = %query.query_type,
            nodes = resolution.nodes.len(),
            edges = resolution.edges.len(),
            "Query resolved"
        );
        resolution
    }

    /// Resolve the start node named by the filters.
    fn start_node(&self, filters: &QueryFilters) -> Option<&'a Node> {
        let entity_id = filters.entity_id.as_deref()?;
        match filters.entity_type {
            Some(entity_type) => self.store.get_node_by_key(entity_type, entity_id),
            None => self
                .store
                .nodes()
                .iter()
                .find(|n| n.entity_id == entity_id || n.id.0.to_string() == entity_id),
        }
    }

    // ── Direct lookups ───────────────────────────────────────────

    pub fn node_by_id(&self, filters: &QueryFilters) -> Resolution {
        let Some(node) = self.start_node(filters) else {
            return Resolution::default();
        };

        Resolution {
            nodes: vec![node.clone()],
            edges: self.incident_edges(std::iter::once(node), filters),
            references: Vec::new(),
        }
    }

    pub fn nodes_by_type(&self, filters: &QueryFilters) -> Resolution {
        let Some(entity_type) = filters.entity_type else {
            return Resolution::default();
        };

        let nodes = self.store.nodes_by_type(entity_type);
        Resolution {
            edges: self.incident_edges(nodes.iter().copied(), filters),
            nodes: nodes.into_iter().cloned().collect(),
            references: Vec::new(),
        }
    }

    pub fn edges_by_node(&self, filters: &QueryFilters) -> Resolution {
        let Some(node) = self.start_node(filters) else {
            return Resolution::default();
        };

        let edges: Vec<Edge> = self
            .store
            .edges_touching(&node.id)
            .into_iter()
            .filter(|e| edge_passes(e, filters))
            .cloned()
            .collect();

        let mut seen: HashSet<NodeId> = HashSet::new();
        let nodes = edges
            .iter()
            .flat_map(|e| [e.from_id, e.to_id])
            .filter(|id| seen.insert(*id))
            .filter_map(|id| self.store.get_node(&id).cloned())
            .collect();

        Resolution {
            nodes,
            edges,
            references: Vec::new(),
        }
    }

    // ── Traversals ───────────────────────────────────────────────

    /// Undirected walk across any edge type.
    pub fn knowledge_for_entity(&self, filters: &QueryFilters) -> Resolution {
        let Some(node) = self.start_node(filters) else {
            return Resolution::default();
        };
        let depth = filters.max_depth.unwrap_or(self.config.knowledge_depth);
        breadth_first(self.store, &node.id, depth, Direction::Both, |e| {
            edge_passes(e, filters)
        })
    }

    /// Walk back to sources. `X derived-from Y` points at the source `Y`, so
    /// lineage follows provenance edges outward from the start node.
    pub fn lineage_trace(&self, filters: &QueryFilters) -> Resolution {
        self.typed_walk(filters, LINEAGE_EDGE_TYPES, self.config.lineage_depth)
    }

    /// Walk forward to everything the start node affects or triggers.
    pub fn impact_analysis(&self, filters: &QueryFilters) -> Resolution {
        self.typed_walk(filters, IMPACT_EDGE_TYPES, self.config.impact_depth)
    }

    fn typed_walk(&self, filters: &QueryFilters, edge_types: &[EdgeType], default_depth: usize) -> Resolution {
        let Some(node) = self.start_node(filters) else {
            return Resolution::default();
        };
        let depth = filters.max_depth.unwrap_or(default_depth);
        breadth_first(self.store, &node.id, depth, Direction::Outgoing, |e| {
            edge_types.contains(&e.edge_type) && meets_strength(e, filters)
        })
    }

    // ── Search ───────────────────────────────────────────────────

    pub fn cross_engine_search(&self, filters: &QueryFilters) -> Resolution {
        let nodes: Vec<&Node> = self
            .store
            .nodes()
            .iter()
            .filter(|n| {
                filters
                    .source_subsystem
                    .map_or(true, |s| n.source.subsystem == s)
            })
            .filter(|n| filters.entity_type.map_or(true, |t| n.entity_type == t))
            .collect();

        Resolution {
            edges: self.incident_edges(nodes.iter().copied(), filters),
            nodes: nodes.into_iter().cloned().collect(),
            references: Vec::new(),
        }
    }

    /// Union of edges touching any of `nodes`, deduplicated, first-seen order.
    fn incident_edges<'n, I>(&self, nodes: I, filters: &QueryFilters) -> Vec<Edge>
    where
        I: IntoIterator<Item = &'n Node>,
    {
        let mut seen: HashSet<EdgeId> = HashSet::new();
        let mut edges = Vec::new();
        for node in nodes {
            for edge in self.store.edges_touching(&node.id) {
                if edge_passes(edge, filters) && seen.insert(edge.id) {
                    edges.push(edge.clone());
                }
            }
        }
        edges
    }
}

fn meets_strength(edge: &Edge, filters: &QueryFilters) -> bool {
    filters.min_strength.map_or(true, |min| edge.strength >= min)
}

fn edge_passes(edge: &Edge, filters: &QueryFilters) -> bool {
    filters.edge_type.map_or(true, |t| edge.edge_type == t) && meets_strength(edge, filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_core::{EntityType, Provenance, ScopeContext, Subsystem};

    fn register(store: &mut GraphStore, entity_type: EntityType, id: &str, scope: ScopeContext) -> NodeId {
        store
            .register(
                entity_type,
                id,
                Provenance::new(entity_type.subsystem(), 1),
                scope,
                id,
                serde_json::json!({}),
            )
            .node
            .id
    }

    /// metric <- insight (derived-from), report -> metric (is-sourced-from),
    /// alert -> incident (triggers), incident -> asset (affects),
    /// insight -> incident (related-to).
    fn build_store() -> GraphStore {
        let mut store = GraphStore::new();
        let t = ScopeContext::tenant("t-1");
        let metric = register(&mut store, EntityType::Metric, "m-1", t.clone());
        let insight = register(&mut store, EntityType::Insight, "i-1", t.clone());
        let report = register(&mut store, EntityType::Report, "r-1", t.clone());
        let alert = register(&mut store, EntityType::Alert, "a-1", t.clone());
        let incident = register(&mut store, EntityType::Incident, "inc-1", t.clone());
        let asset = register(&mut store, EntityType::Asset, "pump-1", t.clone());

        store.link(&insight, &metric, EdgeType::DerivedFrom, "r", "ops").unwrap();
        store.link(&report, &metric, EdgeType::IsSourcedFrom, "r", "ops").unwrap();
        store.link(&alert, &incident, EdgeType::Triggers, "r", "ops").unwrap();
        store.link(&incident, &asset, EdgeType::Affects, "r", "ops").unwrap();
        store.link(&insight, &incident, EdgeType::RelatedTo, "r", "ops").unwrap();
        store
    }

    fn query(query_type: QueryType, filters: QueryFilters) -> FabricQuery {
        FabricQuery::new(query_type, ScopeContext::tenant("t-1"), filters)
    }

    #[test]
    fn test_node_by_id() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::NodeById,
            QueryFilters::for_entity(EntityType::Incident, "inc-1"),
        ));
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.edges.len(), 3);
    }

    #[test]
    fn test_node_by_bare_entity_id() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let filters = QueryFilters {
            entity_id: Some("pump-1".to_string()),
            ..Default::default()
        };
        let result = resolver.resolve(&query(QueryType::NodeById, filters));
        assert_eq!(result.nodes[0].entity_type, EntityType::Asset);
    }

    #[test]
    fn test_nodes_by_type_unions_edges() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let filters = QueryFilters {
            entity_type: Some(EntityType::Metric),
            ..Default::default()
        };
        let result = resolver.resolve(&query(QueryType::NodesByType, filters));
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.edges.len(), 2);
    }

    #[test]
    fn test_edges_by_node_includes_endpoints() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::EdgesByNode,
            QueryFilters::for_entity(EntityType::Metric, "m-1"),
        ));
        assert_eq!(result.edges.len(), 2);
        assert_eq!(result.nodes.len(), 3);
    }

    #[test]
    fn test_edges_by_node_edge_type_filter() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let mut filters = QueryFilters::for_entity(EntityType::Incident, "inc-1");
        filters.edge_type = Some(EdgeType::Affects);
        let result = resolver.resolve(&query(QueryType::EdgesByNode, filters));
        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.nodes.len(), 2);
    }

    #[test]
    fn test_knowledge_default_depth_two() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::KnowledgeForEntity,
            QueryFilters::for_entity(EntityType::Alert, "a-1"),
        ));
        // alert -> incident (1) -> asset, insight (2)
        assert_eq!(result.nodes.len(), 4);
        assert_eq!(result.references.len(), 3);
        assert!(result.references.iter().all(|r| r.depth <= 2));
    }

    #[test]
    fn test_lineage_only_provenance_edges() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::LineageTrace,
            QueryFilters::for_entity(EntityType::Insight, "i-1"),
        ));
        assert!(result
            .edges
            .iter()
            .all(|e| LINEAGE_EDGE_TYPES.contains(&e.edge_type)));
        // insight -> metric; the report also sources from the metric but is
        // not upstream of the insight
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.nodes[1].entity_id, "m-1");
    }

    #[test]
    fn test_lineage_from_source_finds_nothing_upstream() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::LineageTrace,
            QueryFilters::for_entity(EntityType::Metric, "m-1"),
        ));
        assert_eq!(result.nodes.len(), 1);
        assert!(result.edges.is_empty());
        assert!(result.references.is_empty());
    }

    #[test]
    fn test_impact_from_end_of_chain_finds_nothing_downstream() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::ImpactAnalysis,
            QueryFilters::for_entity(EntityType::Asset, "pump-1"),
        ));
        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.nodes[0].entity_id, "pump-1");
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_impact_from_middle_goes_forward_only() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::ImpactAnalysis,
            QueryFilters::for_entity(EntityType::Incident, "inc-1"),
        ));
        let ids: Vec<_> = result.nodes.iter().map(|n| n.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["inc-1", "pump-1"]);
    }

    #[test]
    fn test_impact_only_causal_edges() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::ImpactAnalysis,
            QueryFilters::for_entity(EntityType::Alert, "a-1"),
        ));
        assert_eq!(result.nodes.len(), 3);
        assert!(result
            .edges
            .iter()
            .all(|e| IMPACT_EDGE_TYPES.contains(&e.edge_type)));
    }

    #[test]
    fn test_min_strength_prunes_walk() {
        let mut store = GraphStore::new();
        let t = ScopeContext::tenant("t-1");
        let insight = register(&mut store, EntityType::Insight, "i-1", t.clone());
        register(&mut store, EntityType::Metric, "m-1", t.clone());
        store.infer_links(&insight, "system").unwrap();

        let resolver = QueryResolver::new(&store);
        let mut filters = QueryFilters::for_entity(EntityType::Insight, "i-1");
        filters.min_strength = Some(0.95);
        let result = resolver.resolve(&query(QueryType::KnowledgeForEntity, filters));
        assert_eq!(result.nodes.len(), 1);
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_cross_engine_search_by_subsystem() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let filters = QueryFilters {
            source_subsystem: Some(Subsystem::Health),
            ..Default::default()
        };
        let result = resolver.resolve(&query(QueryType::CrossEngineSearch, filters));
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.edges.len(), 3);
        assert!(result.references.is_empty());
    }

    #[test]
    fn test_cap_truncates_nodes_only() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let q = query(QueryType::CrossEngineSearch, QueryFilters::default()).with_max_results(2);
        let result = resolver.resolve(&q);
        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.edges.len(), 5);
    }

    #[test]
    fn test_config_default_cap() {
        let store = build_store();
        let config = QueryConfig {
            default_max_results: Some(1),
            ..Default::default()
        };
        let resolver = QueryResolver::with_config(&store, config);
        let result = resolver.resolve(&query(QueryType::CrossEngineSearch, QueryFilters::default()));
        assert_eq!(result.nodes.len(), 1);
    }

    #[test]
    fn test_scope_filter_other_tenant() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let q = FabricQuery::new(
            QueryType::CrossEngineSearch,
            ScopeContext::tenant("t-2"),
            QueryFilters::default(),
        );
        let result = resolver.resolve(&q);
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn test_missing_start_node() {
        let store = build_store();
        let resolver = QueryResolver::new(&store);
        let result = resolver.resolve(&query(
            QueryType::ImpactAnalysis,
            QueryFilters::for_entity(EntityType::Alert, "missing"),
        ));
        assert!(result.nodes.is_empty());
    }
}
