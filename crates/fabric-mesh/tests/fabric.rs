//! End-to-end tests for the orchestrator: registration, policy-gated links,
//! scoped queries, and statistics, driven through the public API only.

use fabric_audit::{AuditQuery, AuditSink, MemoryAuditSink};
use fabric_core::events::{AuditAction, AuditEvent};
use fabric_core::policy::{FEDERATION_POLICY, QUERY_POLICY};
use fabric_core::{
    EdgeType, EntityType, FabricConfig, NodeId, Provenance, ScopeContext, WriteOutcome,
};
use fabric_mesh::{DataFabric, FabricKey, FabricRegistry, LinkRequest, RegisterRequest};
use fabric_query::{QueryFilters, QueryRequest};
use fabric_store::GraphStore;

use serde_json::json;

fn register_in(
    fabric: &mut DataFabric,
    entity_type: EntityType,
    entity_id: &str,
    scope: ScopeContext,
    metadata: serde_json::Value,
) -> fabric_mesh::EntityRegistration {
    fabric.register_entity(RegisterRequest {
        entity_id: entity_id.to_string(),
        entity_type,
        source_subsystem: entity_type.subsystem(),
        source_phase: 3,
        name: format!("{entity_type} {entity_id}"),
        scope,
        metadata,
    })
}

fn register(fabric: &mut DataFabric, entity_type: EntityType, entity_id: &str, tenant: &str) {
    register_in(fabric, entity_type, entity_id, ScopeContext::tenant(tenant), json!({}));
}

fn link_request(
    from: (EntityType, &str),
    to: (EntityType, &str),
    edge_type: EdgeType,
) -> LinkRequest {
    LinkRequest {
        from_entity_id: from.1.to_string(),
        from_type: from.0,
        to_entity_id: to.1.to_string(),
        to_type: to.0,
        edge_type,
        rationale: "linked by integration test".to_string(),
        actor: "user:tester".to_string(),
    }
}

fn query(query_type: &str, scope: ScopeContext, filters: QueryFilters) -> QueryRequest {
    QueryRequest {
        query_type: query_type.to_string(),
        scope,
        filters,
        max_results: None,
    }
}

// ── Registration ──────────────────────────────────────────────────

#[test]
fn reregistration_keeps_id_and_takes_latest_metadata() {
    let mut fabric = DataFabric::default();

    let first = register_in(
        &mut fabric,
        EntityType::Asset,
        "pump-7",
        ScopeContext::tenant("acme"),
        json!({ "vendor": "old" }),
    );
    let second = register_in(
        &mut fabric,
        EntityType::Asset,
        "pump-7",
        ScopeContext::tenant("acme"),
        json!({ "vendor": "new" }),
    );

    assert_eq!(first.node.id, second.node.id);
    assert_eq!(first.node.id, NodeId::derive(EntityType::Asset, "pump-7"));
    assert_eq!(first.outcome, WriteOutcome::Created);
    assert_eq!(second.outcome, WriteOutcome::Replaced);

    let stored = fabric
        .store()
        .get_node_by_key(EntityType::Asset, "pump-7")
        .unwrap();
    assert_eq!(stored.metadata["vendor"], "new");
    assert_eq!(fabric.store().node_count(), 1);
}

#[test]
fn inference_links_training_module_to_pack_only() {
    let mut store = GraphStore::new();
    let scope = ScopeContext::tenant("acme");
    let tm = store
        .register(
            EntityType::TrainingModule,
            "tm-1",
            Provenance::new(EntityType::TrainingModule.subsystem(), 1),
            scope.clone(),
            "Lockout basics",
            json!({}),
        )
        .node;
    store.register(
        EntityType::KnowledgePack,
        "kp-1",
        Provenance::new(EntityType::KnowledgePack.subsystem(), 1),
        scope.clone(),
        "Lockout pack",
        json!({}),
    );
    store.register(
        EntityType::KgNode,
        "kg-1",
        Provenance::new(EntityType::KgNode.subsystem(), 1),
        scope,
        "Lockout concept",
        json!({}),
    );

    let inferred = store.infer_links(&tm.id, "system:inference").unwrap();
    assert_eq!(inferred.len(), 1);
    assert_eq!(inferred[0].edge_type, EdgeType::References);
    assert_eq!(inferred[0].strength, 0.8);
    assert_eq!(
        inferred[0].to_id,
        NodeId::derive(EntityType::KnowledgePack, "kp-1")
    );

    let kg = NodeId::derive(EntityType::KgNode, "kg-1");
    assert!(store.edges_touching(&kg).is_empty());
}

#[test]
fn registration_time_inference_flows_through_the_fabric() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Metric, "m-1", "acme");
    register(&mut fabric, EntityType::Metric, "m-2", "acme");

    let insight = register_in(
        &mut fabric,
        EntityType::Insight,
        "i-1",
        ScopeContext::tenant("acme"),
        json!({}),
    );
    assert_eq!(insight.inferred.len(), 2);
    assert!(insight
        .inferred
        .iter()
        .all(|e| e.edge_type == EdgeType::DerivedFrom && e.strength == 0.9));
}

// ── Links ─────────────────────────────────────────────────────────

#[test]
fn cross_tenant_link_without_eligibility_is_denied() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Insight, "i-1", "acme");
    register_in(
        &mut fabric,
        EntityType::Report,
        "r-1",
        ScopeContext::facility("globex", "plant-2"),
        json!({}),
    );

    let result = fabric.create_link(&link_request(
        (EntityType::Insight, "i-1"),
        (EntityType::Report, "r-1"),
        EdgeType::References,
    ));

    assert!(!result.success);
    assert!(result.edge.is_none());
    let federation = result
        .evaluations
        .iter()
        .find(|e| e.policy_name == FEDERATION_POLICY)
        .unwrap();
    assert!(!federation.allowed);
    assert!(result.error.unwrap().starts_with("Policy denied"));
    assert_eq!(fabric.store().edge_count(), 0);
}

#[test]
fn cross_tenant_link_between_eligible_nodes_is_federated() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Insight, "i-1", "acme");
    register(&mut fabric, EntityType::Report, "r-1", "globex");

    let result = fabric.create_link(&link_request(
        (EntityType::Insight, "i-1"),
        (EntityType::Report, "r-1"),
        EdgeType::References,
    ));

    assert!(result.success);
    assert_eq!(result.evaluations.len(), 3);
    assert!(result.evaluations.iter().all(|e| e.allowed));
    assert_eq!(result.edge.unwrap().strength, 1.0);
}

#[test]
fn link_attempts_are_audited() {
    let sink = MemoryAuditSink::new();
    let mut fabric = DataFabric::default().with_audit_sink(Box::new(sink));
    register(&mut fabric, EntityType::Alert, "al-1", "acme");

    let missing = fabric.create_link(&link_request(
        (EntityType::Alert, "al-1"),
        (EntityType::Incident, "inc-404"),
        EdgeType::Triggers,
    ));
    assert!(!missing.success);

    // one registration plus one denied link
    assert_eq!(fabric.audit().event_count(), 2);
    assert_eq!(fabric.audit().query_event_count(), 0);
}

#[test]
fn memory_sink_chain_survives_a_session() {
    let mut sink = MemoryAuditSink::new();
    sink.emit(AuditEvent::new(
        "acme",
        "user:tester",
        AuditAction::QueryDenied {
            query_type: "lineage-trace".to_string(),
            reason: "query policy is inactive".to_string(),
        },
    ));
    assert!(sink.verify_chain().is_ok());
    let hits = sink.list(&AuditQuery {
        queries_only: true,
        ..Default::default()
    });
    assert_eq!(hits.len(), 1);
}

// ── Queries ───────────────────────────────────────────────────────

#[test]
fn knowledge_for_isolated_node_returns_only_the_start() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Vendor, "v-1", "acme");

    let result = fabric
        .execute_query(&query(
            "knowledge-for-entity",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Vendor, "v-1"),
        ))
        .unwrap();

    assert!(!result.denied);
    assert_eq!(result.total_nodes, 1);
    assert_eq!(result.nodes[0].entity_id, "v-1");
    assert_eq!(result.total_edges, 0);
    assert!(result.references.is_empty());
}

#[test]
fn lineage_trace_follows_only_provenance_edges() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Metric, "m-1", "acme");
    // report -> metric (is-sourced-from) inferred on registration
    register(&mut fabric, EntityType::Report, "r-1", "acme");
    register(&mut fabric, EntityType::Dashboard, "d-1", "acme");

    let related = fabric.create_link(&link_request(
        (EntityType::Report, "r-1"),
        (EntityType::Dashboard, "d-1"),
        EdgeType::RelatedTo,
    ));
    assert!(related.success);
    let affects = fabric.create_link(&link_request(
        (EntityType::Metric, "m-1"),
        (EntityType::Dashboard, "d-1"),
        EdgeType::Affects,
    ));
    assert!(affects.success);

    let result = fabric
        .execute_query(&query(
            "lineage-trace",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Report, "r-1"),
        ))
        .unwrap();

    assert_eq!(result.total_edges, 1);
    assert!(result
        .edges
        .iter()
        .all(|e| matches!(e.edge_type, EdgeType::DerivedFrom | EdgeType::IsSourcedFrom)));
    assert!(result.nodes.iter().all(|n| n.entity_id != "d-1"));
}

#[test]
fn impact_analysis_walks_causal_chain() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Asset, "as-1", "acme");
    register(&mut fabric, EntityType::Incident, "inc-1", "acme");
    register(&mut fabric, EntityType::Alert, "al-1", "acme");

    let result = fabric
        .execute_query(&query(
            "impact-analysis",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Alert, "al-1"),
        ))
        .unwrap();

    let ids: Vec<_> = result.references.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["inc-1", "as-1"]);
    assert_eq!(result.references[1].depth, 2);
}

#[test]
fn walks_from_the_end_of_a_chain_stay_put() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Asset, "as-1", "acme");
    register(&mut fabric, EntityType::Incident, "inc-1", "acme");
    register(&mut fabric, EntityType::Alert, "al-1", "acme");
    register(&mut fabric, EntityType::Metric, "m-1", "acme");
    register(&mut fabric, EntityType::Insight, "i-1", "acme");

    let impact = fabric
        .execute_query(&query(
            "impact-analysis",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Asset, "as-1"),
        ))
        .unwrap();
    let ids: Vec<_> = impact.nodes.iter().map(|n| n.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["as-1"]);

    let lineage = fabric
        .execute_query(&query(
            "lineage-trace",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Metric, "m-1"),
        ))
        .unwrap();
    let ids: Vec<_> = lineage.nodes.iter().map(|n| n.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["m-1"]);

    let upstream = fabric
        .execute_query(&query(
            "lineage-trace",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Insight, "i-1"),
        ))
        .unwrap();
    let ids: Vec<_> = upstream.nodes.iter().map(|n| n.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["i-1", "m-1"]);
}

#[test]
fn moving_a_node_to_a_facility_carries_its_edges() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Incident, "inc-1", "acme");
    register(&mut fabric, EntityType::Alert, "al-1", "acme");

    register_in(
        &mut fabric,
        EntityType::Incident,
        "inc-1",
        ScopeContext::facility("acme", "plant-9"),
        json!({}),
    );

    let node = fabric
        .store()
        .get_node_by_key(EntityType::Incident, "inc-1")
        .unwrap();
    let edges = fabric.store().edges_touching(&node.id);
    assert_eq!(edges.len(), 1);
    assert!(edges[0].visibility >= node.visibility);

    let result = fabric
        .execute_query(&query(
            "edges-by-node",
            ScopeContext::facility("acme", "plant-9"),
            QueryFilters::for_entity(EntityType::Incident, "inc-1"),
        ))
        .unwrap();
    assert_eq!(result.total_edges, 1);
    assert_eq!(result.edges[0].edge_type, EdgeType::Triggers);
}

#[test]
fn facility_scoped_query_drops_global_nodes() {
    let mut fabric = DataFabric::default();
    register_in(
        &mut fabric,
        EntityType::KnowledgePack,
        "kp-global",
        ScopeContext::global("acme"),
        json!({}),
    );
    register_in(
        &mut fabric,
        EntityType::KnowledgePack,
        "kp-plant",
        ScopeContext::facility("acme", "plant-1"),
        json!({}),
    );

    let mut filters = QueryFilters::default();
    filters.entity_type = Some(EntityType::KnowledgePack);

    let facility = fabric
        .execute_query(&query(
            "nodes-by-type",
            ScopeContext::facility("acme", "plant-1"),
            filters.clone(),
        ))
        .unwrap();
    let ids: Vec<_> = facility.nodes.iter().map(|n| n.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["kp-plant"]);

    let tenant = fabric
        .execute_query(&query("nodes-by-type", ScopeContext::tenant("acme"), filters))
        .unwrap();
    assert_eq!(tenant.total_nodes, 2);
}

#[test]
fn other_tenants_never_leak_into_results() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Listing, "l-1", "acme");
    register(&mut fabric, EntityType::Listing, "l-2", "globex");

    let result = fabric
        .execute_query(&query(
            "cross-engine-search",
            ScopeContext::tenant("acme"),
            QueryFilters::default(),
        ))
        .unwrap();
    assert_eq!(result.total_nodes, 1);
    assert_eq!(result.nodes[0].tenant_id(), "acme");
}

#[test]
fn max_results_truncates_nodes_only() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Metric, "m-1", "acme");
    register(&mut fabric, EntityType::Metric, "m-2", "acme");
    register(&mut fabric, EntityType::Insight, "i-1", "acme");

    let mut request = query(
        "cross-engine-search",
        ScopeContext::tenant("acme"),
        QueryFilters::default(),
    );
    request.max_results = Some(1);

    let result = fabric.execute_query(&request).unwrap();
    assert_eq!(result.nodes.len(), 1);
    assert_eq!(result.edges.len(), 2);
}

#[test]
fn deactivated_query_policy_denies_without_resolving() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Kpi, "kpi-1", "acme");
    assert!(fabric.policy_mut().set_policy_active("pol-query", false));

    let evaluation = fabric.policy().evaluate_query(&ScopeContext::tenant("acme"));
    assert!(!evaluation.allowed);
    assert_eq!(evaluation.reason, "query policy is inactive");

    let result = fabric
        .execute_query(&query(
            "node-by-id",
            ScopeContext::tenant("acme"),
            QueryFilters::for_entity(EntityType::Kpi, "kpi-1"),
        ))
        .unwrap();
    assert!(result.denied);
    assert_eq!(result.total_nodes, 0);
    assert_eq!(result.total_edges, 0);
    assert_eq!(result.evaluations.len(), 1);
    assert_eq!(result.evaluations[0].policy_name, QUERY_POLICY);
}

#[test]
fn unknown_query_type_is_an_error_not_a_denial() {
    let mut fabric = DataFabric::default();
    let err = fabric
        .execute_query(&query(
            "shortest-path",
            ScopeContext::tenant("acme"),
            QueryFilters::default(),
        ))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown query type: shortest-path");
}

// ── Statistics and registry ───────────────────────────────────────

#[test]
fn statistics_count_every_query_event() {
    let mut fabric = DataFabric::default();
    register(&mut fabric, EntityType::Incident, "inc-1", "acme");
    register(&mut fabric, EntityType::Alert, "al-1", "acme");

    let request = query(
        "edges-by-node",
        ScopeContext::tenant("acme"),
        QueryFilters::for_entity(EntityType::Incident, "inc-1"),
    );
    fabric.execute_query(&request).unwrap();
    fabric.execute_query(&request).unwrap();
    fabric.policy_mut().set_policy_active("pol-query", false);
    fabric.execute_query(&request).unwrap();

    let stats = fabric.get_statistics();
    assert_eq!(stats.total_nodes, 2);
    assert_eq!(stats.total_edges, 1);
    assert_eq!(stats.edges_by_type[&EdgeType::Triggers], 1);
    assert_eq!(stats.queries_last_24h, 3);
    assert!(stats.last_updated.is_some());
}

#[test]
fn registry_keeps_fabrics_apart() {
    let mut config = FabricConfig::default();
    config.query.default_max_results = Some(10);
    let mut registry = FabricRegistry::new(config);

    let plant_1 = FabricKey::facility("acme", "plant-1");
    let plant_2 = FabricKey::facility("acme", "plant-2");

    register(registry.get_or_create(&plant_1), EntityType::Alert, "al-1", "acme");
    register(registry.get_or_create(&plant_2), EntityType::Incident, "inc-1", "acme");

    // No alert -> incident edge: the two nodes live in different stores.
    assert_eq!(registry.get(&plant_1).unwrap().store().edge_count(), 0);
    assert_eq!(registry.get(&plant_2).unwrap().store().edge_count(), 0);
    assert_eq!(
        registry.get(&plant_2).unwrap().config().query.default_max_results,
        Some(10)
    );

    assert!(registry.teardown(&plant_1).is_some());
    assert_eq!(registry.keys(), vec![&plant_2]);
}
