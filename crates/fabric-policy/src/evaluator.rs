//! Policy evaluation engine.
//!
//! Link checks run as a fail-fast sequence: the returned vector ends at the
//! first denial, or with a final "all checks passed" record when every
//! check succeeds.

use fabric_core::policy::{
    default_policies, EDGE_TYPE_POLICY, FEDERATION_POLICY, QUERY_POLICY, TENANT_ISOLATION,
};
use fabric_core::{EdgeType, Node, Policy, PolicyEvaluation, ScopeContext, Visibility};

const LINK_CHAIN_ID: &str = "link-chain";
const LINK_CHAIN_NAME: &str = "link-evaluation";

/// Whether a sequence of evaluations ended in a pass.
pub fn all_passed(evaluations: &[PolicyEvaluation]) -> bool {
    !evaluations.is_empty() && evaluations.iter().all(|e| e.allowed)
}

/// Evaluates fabric operations against a policy table.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    policies: Vec<Policy>,
}

impl Default for PolicyEvaluator {
    fn default() -> Self {
        Self::new(default_policies())
    }
}

impl PolicyEvaluator {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    // ── Registry ─────────────────────────────────────────────────

    /// Append a policy. Overlap with existing policies is not checked; name
    /// lookups resolve to the first registered match.
    pub fn add_policy(&mut self, policy: Policy) {
        tracing::debug!(policy_id = %policy.id, name = %policy.name, "Policy added");
        self.policies.push(policy);
    }

    pub fn get_policy(&self, id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }

    pub fn list_policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Activate or deactivate a policy by ID. Returns false if no such policy exists.
    pub fn set_policy_active(&mut self, id: &str, active: bool) -> bool {
        match self.policies.iter_mut().find(|p| p.id == id) {
            Some(policy) => {
                policy.active = active;
                tracing::info!(policy_id = id, active, "Policy activation changed");
                true
            }
            None => false,
        }
    }

    fn by_name(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name == name)
    }

    fn active_by_name(&self, name: &str) -> Option<&Policy> {
        self.by_name(name).filter(|p| p.active)
    }

    /// ID and name to attribute tenant-isolation decisions to.
    fn isolation_ref(&self) -> (String, String) {
        match self.by_name(TENANT_ISOLATION) {
            Some(p) => (p.id.clone(), p.name.clone()),
            None => (TENANT_ISOLATION.to_string(), TENANT_ISOLATION.to_string()),
        }
    }

    // ── Checks ───────────────────────────────────────────────────

    /// Evaluate a proposed `from -> to` link of `edge_type`.
    ///
    /// Checks, in order: federation (only when tenants differ), then the
    /// edge-type allow-list. Stops at the first denial.
    pub fn evaluate_link(&self, from: &Node, to: &Node, edge_type: EdgeType) -> Vec<PolicyEvaluation> {
        let mut evaluations = Vec::with_capacity(3);

        if from.tenant_id() != to.tenant_id() {
            let federation = self.check_federation(from, to, edge_type);
            let allowed = federation.allowed;
            evaluations.push(federation);
            if !allowed {
                tracing::warn!(
                    from = %from.id,
                    to = %to.id,
                    edge_type = %edge_type,
                    "Cross-tenant link denied"
                );
                return evaluations;
            }
        }

        let edge_check = self.check_edge_type(edge_type);
        let allowed = edge_check.allowed;
        evaluations.push(edge_check);
        if !allowed {
            tracing::warn!(edge_type = %edge_type, "Edge type denied");
            return evaluations;
        }

        evaluations.push(PolicyEvaluation::allow(
            LINK_CHAIN_ID,
            LINK_CHAIN_NAME,
            "All policy checks passed",
        ));
        evaluations
    }

    fn check_federation(&self, from: &Node, to: &Node, edge_type: EdgeType) -> PolicyEvaluation {
        let Some(federation) = self.active_by_name(FEDERATION_POLICY) else {
            let (id, name) = self.isolation_ref();
            return PolicyEvaluation::deny(
                &id,
                &name,
                format!(
                    "Cross-tenant link {} -> {} denied: no active federation policy",
                    from.tenant_id(),
                    to.tenant_id()
                ),
            );
        };

        let deny = |reason: String| PolicyEvaluation::deny(&federation.id, &federation.name, reason);

        if !federation.cross_tenant_links {
            return deny("Federation policy does not permit cross-tenant links".to_string());
        }
        if !(from.federation_eligible && to.federation_eligible) {
            return deny(format!(
                "Both endpoints must be federation-eligible (from: {}, to: {})",
                from.federation_eligible, to.federation_eligible
            ));
        }
        if !federation.allows_edge_type(edge_type) {
            return deny(format!("Edge type {edge_type} is not federated"));
        }
        for entity_type in [from.entity_type, to.entity_type] {
            if !federation.allows_entity_type(entity_type) {
                return deny(format!("Entity type {entity_type} is not federated"));
            }
        }

        PolicyEvaluation::allow(
            &federation.id,
            &federation.name,
            format!(
                "Cross-tenant link {} -> {} sanctioned by federation",
                from.tenant_id(),
                to.tenant_id()
            ),
        )
    }

    fn check_edge_type(&self, edge_type: EdgeType) -> PolicyEvaluation {
        match self.active_by_name(EDGE_TYPE_POLICY) {
            Some(policy) if policy.allows_edge_type(edge_type) => PolicyEvaluation::allow(
                &policy.id,
                &policy.name,
                format!("Edge type {edge_type} is allowed"),
            ),
            Some(policy) => PolicyEvaluation::deny(
                &policy.id,
                &policy.name,
                format!("Edge type {edge_type} is not in the allow-list"),
            ),
            None => PolicyEvaluation::allow(
                EDGE_TYPE_POLICY,
                EDGE_TYPE_POLICY,
                format!("No active edge-type policy; {edge_type} accepted"),
            ),
        }
    }

    /// Evaluate whether `requester` may see `node`.
    ///
    /// Tenant must match. Facility must match only for facility-visible or
    /// restricted nodes; public and tenant-visible nodes skip that check.
    pub fn evaluate_node_access(&self, node: &Node, requester: &ScopeContext) -> PolicyEvaluation {
        let (id, name) = self.isolation_ref();

        if node.tenant_id() != requester.tenant_id {
            return PolicyEvaluation::deny(
                &id,
                &name,
                format!(
                    "Tenant mismatch: node belongs to {}, requester is {}",
                    node.tenant_id(),
                    requester.tenant_id
                ),
            );
        }

        if matches!(node.visibility, Visibility::Facility | Visibility::Restricted)
            && node.scope.facility_id != requester.facility_id
        {
            return PolicyEvaluation::deny(
                &id,
                &name,
                format!(
                    "Facility mismatch: node is {:?}-visible in facility {:?}",
                    node.visibility, node.scope.facility_id
                ),
            );
        }

        PolicyEvaluation::allow(&id, &name, "Access granted")
    }

    /// Evaluate whether `requester` may run a query at all.
    pub fn evaluate_query(&self, requester: &ScopeContext) -> PolicyEvaluation {
        let evaluation = match self.by_name(QUERY_POLICY) {
            Some(policy) if policy.active => {
                PolicyEvaluation::allow(&policy.id, &policy.name, "Query permitted by query policy")
            }
            Some(policy) => {
                PolicyEvaluation::deny(&policy.id, &policy.name, "query policy is inactive")
            }
            None => PolicyEvaluation::allow(
                QUERY_POLICY,
                QUERY_POLICY,
                "No query policy registered; allowed by default",
            ),
        };

        tracing::debug!(
            tenant_id = %requester.tenant_id,
            allowed = evaluation.allowed,
            "Query policy evaluated"
        );
        evaluation
    }
}
