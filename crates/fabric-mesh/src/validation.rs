//! Structural validation for link requests.
//!
//! `DataFabric::create_link` does not call this; callers that want malformed
//! requests rejected up front run it themselves.

use fabric_core::{FabricError, Result};

use crate::types::LinkRequest;

const MAX_RATIONALE_LEN: usize = 2048;

/// Check a link request for malformed fields, reporting every problem found.
pub fn validate_link_request(request: &LinkRequest) -> Result<()> {
    let mut problems = Vec::new();

    if request.from_entity_id.trim().is_empty() {
        problems.push("from_entity_id is empty".to_string());
    }
    if request.to_entity_id.trim().is_empty() {
        problems.push("to_entity_id is empty".to_string());
    }
    if request.from_type == request.to_type && request.from_entity_id == request.to_entity_id {
        problems.push("an entity cannot be linked to itself".to_string());
    }
    if request.rationale.trim().is_empty() {
        problems.push("rationale is empty".to_string());
    } else if request.rationale.len() > MAX_RATIONALE_LEN {
        problems.push(format!("rationale exceeds {MAX_RATIONALE_LEN} bytes"));
    }
    if request.actor.trim().is_empty() {
        problems.push("actor is empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(FabricError::Validation(problems.join("; ")))
    }
}
