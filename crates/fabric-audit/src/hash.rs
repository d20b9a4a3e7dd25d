//! BLAKE3 content hashing for tamper evidence.
//!
//! Each record hash covers the event and the previous record's hash, so
//! altering or removing any record breaks every later link.

use fabric_core::events::AuditEvent;
use serde::Serialize;

/// Hashable representation of an audit record (excludes its own hash).
#[derive(Serialize)]
struct HashableRecord<'a> {
    event: &'a AuditEvent,
    prev_hash: &'a Option<String>,
}

/// Compute the hex-encoded BLAKE3 hash of `event` chained onto `prev_hash`.
pub fn compute_record_hash(event: &AuditEvent, prev_hash: &Option<String>) -> String {
    let hashable = HashableRecord { event, prev_hash };
    let json = serde_json::to_vec(&hashable).expect("Audit event serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}
