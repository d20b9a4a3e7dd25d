//! Requester scope filtering applied to every query result.
//!
//! Tenant must match exactly. When the requester names a facility or room,
//! only records carrying that exact facility or room survive, so records
//! with no facility (for example global-scope nodes) drop out of
//! facility-scoped queries even though they are publicly visible.

use std::collections::HashSet;

use fabric_core::{NodeId, ScopeContext};

use crate::types::Resolution;

/// Whether a record at `scope` is visible to `requester`.
pub fn scope_matches(scope: &ScopeContext, requester: &ScopeContext) -> bool {
    if scope.tenant_id != requester.tenant_id {
        return false;
    }
    if let Some(facility) = &requester.facility_id {
        if scope.facility_id.as_ref() != Some(facility) {
            return false;
        }
    }
    if let Some(room) = &requester.room_id {
        if scope.room_id.as_ref() != Some(room) {
            return false;
        }
    }
    true
}

/// Drop nodes, edges, and cross-references outside `requester`'s scope.
pub fn apply_scope(resolution: &mut Resolution, requester: &ScopeContext) {
    resolution
        .nodes
        .retain(|n| scope_matches(&n.scope, requester));
    resolution
        .edges
        .retain(|e| scope_matches(&e.scope, requester));

    let surviving: HashSet<NodeId> = resolution.nodes.iter().map(|n| n.id).collect();
    resolution
        .references
        .retain(|r| surviving.contains(&r.node_id));
}
