//! The data fabric orchestrator.
//!
//! Composes the graph store, policy evaluator, query resolver, and audit
//! sink. All documented failure paths come back as structured results; the
//! one error that escapes is `FabricError::UnknownQueryType` from
//! `execute_query`.

use std::time::Instant;

use fabric_audit::{AuditSink, MemoryAuditSink};
use fabric_core::events::{AuditAction, AuditEvent};
use fabric_core::{
    EntityType, FabricConfig, FabricError, PolicyEvaluation, Provenance, Result, ScopeContext,
};
use fabric_policy::{all_passed, PolicyEvaluator};
use fabric_query::{FabricQuery, QueryRequest, QueryResolver, QueryResult};
use fabric_store::GraphStore;

use crate::types::{EntityRegistration, FabricStatistics, LinkRequest, LinkResult, RegisterRequest};

/// Actor recorded on query audit events.
const QUERY_ACTOR: &str = "fabric:query";

/// One tenant/facility fabric: store, policy, and audit trail.
pub struct DataFabric {
    store: GraphStore,
    policy: PolicyEvaluator,
    audit: Box<dyn AuditSink>,
    config: FabricConfig,
}

impl Default for DataFabric {
    fn default() -> Self {
        Self::new(FabricConfig::default())
    }
}

impl DataFabric {
    /// Create a fabric seeded with the configured policy table and an
    /// in-memory audit sink.
    pub fn new(config: FabricConfig) -> Self {
        Self {
            store: GraphStore::new(),
            policy: PolicyEvaluator::new(config.policies.clone()),
            audit: Box::new(MemoryAuditSink::new()),
            config,
        }
    }

    /// Replace the audit sink.
    pub fn with_audit_sink(mut self, sink: Box<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn policy(&self) -> &PolicyEvaluator {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut PolicyEvaluator {
        &mut self.policy
    }

    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    pub fn config(&self) -> &FabricConfig {
        &self.config
    }

    fn emit(&mut self, tenant_id: &str, actor: &str, action: AuditAction) {
        if self.config.audit.enabled {
            self.audit.emit(AuditEvent::new(tenant_id, actor, action));
        }
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Register an entity, then infer links for the new node.
    ///
    /// Re-registering an existing `(entity_type, entity_id)` replaces the
    /// earlier record; the outcome reports which happened.
    pub fn register_entity(&mut self, request: RegisterRequest) -> EntityRegistration {
        let registration = self.store.register(
            request.entity_type,
            &request.entity_id,
            Provenance::new(request.source_subsystem, request.source_phase),
            request.scope,
            &request.name,
            request.metadata,
        );
        let node = registration.node;

        let inferred = if self.config.inference.enabled {
            // The node was written just above, so the lookup cannot miss.
            self.store
                .infer_links(&node.id, &self.config.inference.actor)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        tracing::info!(
            node_id = %node.id,
            entity_type = %node.entity_type,
            outcome = ?registration.outcome,
            inferred = inferred.len(),
            "Entity registered"
        );

        let tenant_id = node.tenant_id().to_string();
        self.emit(
            &tenant_id,
            request.source_subsystem.as_str(),
            AuditAction::EntityRegistered {
                node_id: node.id,
                entity_type: node.entity_type,
                entity_id: node.entity_id.clone(),
                outcome: registration.outcome,
                inferred_edges: inferred.len() as u32,
            },
        );

        EntityRegistration {
            node,
            outcome: registration.outcome,
            inferred,
        }
    }

    /// Link two registered entities after a full policy pass.
    ///
    /// Does not run `validate_link_request`.
    pub fn create_link(&mut self, request: &LinkRequest) -> LinkResult {
        let endpoints = (
            self.store
                .get_node_by_key(request.from_type, &request.from_entity_id),
            self.store.get_node_by_key(request.to_type, &request.to_entity_id),
        );

        let (from, to) = match endpoints {
            (Some(from), Some(to)) => (from, to),
            // The denial is audited under the tenant of whichever endpoint exists.
            (None, found) => {
                let tenant_id = found.map(|n| n.tenant_id().to_string());
                let err = FabricError::EndpointNotFound {
                    entity_type: request.from_type.to_string(),
                    entity_id: request.from_entity_id.clone(),
                };
                return self.deny_link(request, tenant_id.as_deref(), err.to_string(), Vec::new());
            }
            (Some(found), None) => {
                let tenant_id = found.tenant_id().to_string();
                let err = FabricError::EndpointNotFound {
                    entity_type: request.to_type.to_string(),
                    entity_id: request.to_entity_id.clone(),
                };
                return self.deny_link(request, Some(&tenant_id), err.to_string(), Vec::new());
            }
        };

        let evaluations = self.policy.evaluate_link(from, to, request.edge_type);
        let tenant_id = from.tenant_id().to_string();
        let (from_id, to_id) = (from.id, to.id);

        if !all_passed(&evaluations) {
            let reason = evaluations
                .last()
                .map(|e| e.reason.clone())
                .unwrap_or_else(|| "no policy decision".to_string());
            let err = FabricError::PolicyDenied(reason);
            return self.deny_link(request, Some(&tenant_id), err.to_string(), evaluations);
        }

        match self.store.link(
            &from_id,
            &to_id,
            request.edge_type,
            &request.rationale,
            &request.actor,
        ) {
            Ok(write) => {
                self.emit(
                    &tenant_id,
                    &request.actor,
                    AuditAction::LinkCreated {
                        edge_id: write.edge.id,
                        edge_type: write.edge.edge_type,
                        from_id,
                        to_id,
                        outcome: write.outcome,
                    },
                );
                LinkResult::created(write.edge, write.outcome, evaluations)
            }
            Err(e) => self.deny_link(request, Some(&tenant_id), e.to_string(), evaluations),
        }
    }

    fn deny_link(
        &mut self,
        request: &LinkRequest,
        tenant_id: Option<&str>,
        reason: String,
        evaluations: Vec<PolicyEvaluation>,
    ) -> LinkResult {
        tracing::warn!(
            from = %request.from_entity_id,
            to = %request.to_entity_id,
            edge_type = %request.edge_type,
            reason = %reason,
            "Link request refused"
        );

        self.emit(
            tenant_id.unwrap_or_default(),
            &request.actor,
            AuditAction::LinkDenied {
                from_entity_id: request.from_entity_id.clone(),
                to_entity_id: request.to_entity_id.clone(),
                edge_type: request.edge_type,
                reason: reason.clone(),
            },
        );

        LinkResult::failed(reason, evaluations)
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Parse and run a query request.
    ///
    /// Fails only with `UnknownQueryType`; a policy denial comes back as an
    /// empty result with `denied` set.
    pub fn execute_query(&mut self, request: &QueryRequest) -> Result<QueryResult> {
        let query = request.parse()?;
        Ok(self.run_query(&query))
    }

    /// Run an already-typed query.
    pub fn run_query(&mut self, query: &FabricQuery) -> QueryResult {
        let evaluation = self.policy.evaluate_query(&query.scope);
        let tenant_id = query.scope.tenant_id.clone();

        if !evaluation.allowed {
            self.emit(
                &tenant_id,
                QUERY_ACTOR,
                AuditAction::QueryDenied {
                    query_type: query.query_type.to_string(),
                    reason: evaluation.reason.clone(),
                },
            );
            return QueryResult::denied(query.query_type, evaluation);
        }

        let start = Instant::now();
        let resolution =
            QueryResolver::with_config(&self.store, self.config.query.clone()).resolve(query);
        let execution_ms = start.elapsed().as_millis() as u64;

        let result =
            QueryResult::from_resolution(query.query_type, resolution, execution_ms, vec![evaluation]);

        self.emit(
            &tenant_id,
            QUERY_ACTOR,
            AuditAction::QueryExecuted {
                query_type: result.query_type.clone(),
                node_count: result.total_nodes as u32,
                edge_count: result.total_edges as u32,
                execution_ms,
            },
        );

        result
    }

    /// Evaluate whether `requester` may see the node for `(entity_type, entity_id)`.
    pub fn check_node_access(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        requester: &ScopeContext,
    ) -> Result<PolicyEvaluation> {
        let node = self
            .store
            .get_node_by_key(entity_type, entity_id)
            .ok_or_else(|| FabricError::EndpointNotFound {
                entity_type: entity_type.to_string(),
                entity_id: entity_id.to_string(),
            })?;
        Ok(self.policy.evaluate_node_access(node, requester))
    }

    /// Aggregate node and edge counts.
    ///
    /// `queries_last_24h` counts every query audit event regardless of its
    /// timestamp.
    pub fn get_statistics(&self) -> FabricStatistics {
        let mut stats = FabricStatistics {
            total_nodes: self.store.node_count(),
            total_edges: self.store.edge_count(),
            nodes_by_type: Default::default(),
            nodes_by_subsystem: Default::default(),
            edges_by_type: Default::default(),
            federation_eligible_nodes: 0,
            queries_last_24h: self.audit.query_event_count(),
            last_updated: self.store.last_modified(),
        };

        for node in self.store.nodes() {
            *stats.nodes_by_type.entry(node.entity_type).or_default() += 1;
            *stats
                .nodes_by_subsystem
                .entry(node.source.subsystem)
                .or_default() += 1;
            if node.federation_eligible {
                stats.federation_eligible_nodes += 1;
            }
        }
        for edge in self.store.edges() {
            *stats.edges_by_type.entry(edge.edge_type).or_default() += 1;
        }

        stats
    }
}
