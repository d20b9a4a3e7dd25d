//! In-memory, hash-chained audit log.

use chrono::{DateTime, Utc};
use fabric_core::events::AuditEvent;
use serde::{Deserialize, Serialize};

use crate::hash::compute_record_hash;
use crate::sink::AuditSink;
use crate::AuditError;

/// One stored event with its chain links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event: AuditEvent,
    pub prev_hash: Option<String>,
    pub content_hash: String,
}

/// Query parameters for listing audit events.
#[derive(Debug, Default)]
pub struct AuditQuery {
    /// Filter by tenant.
    pub tenant_id: Option<String>,
    /// Filter by actor.
    pub actor: Option<String>,
    /// Only include query events.
    pub queries_only: bool,
    /// Only include events at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only include events at or before this time.
    pub to: Option<DateTime<Utc>>,
}

/// Keeps every event in process memory, chained by BLAKE3 hashes.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Vec<AuditRecord>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Events matching `query`, oldest first.
    pub fn list(&self, query: &AuditQuery) -> Vec<&AuditEvent> {
        self.records
            .iter()
            .map(|r| &r.event)
            .filter(|e| matches_query(e, query))
            .collect()
    }

    /// Recompute every hash and check each record links to its predecessor.
    pub fn verify_chain(&self) -> Result<(), AuditError> {
        let mut prev: Option<String> = None;
        for (index, record) in self.records.iter().enumerate() {
            if record.prev_hash != prev {
                return Err(AuditError::LinkMismatch { index });
            }
            if compute_record_hash(&record.event, &record.prev_hash) != record.content_hash {
                return Err(AuditError::ChainBroken { index });
            }
            prev = Some(record.content_hash.clone());
        }
        Ok(())
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&mut self, event: AuditEvent) {
        let prev_hash = self.records.last().map(|r| r.content_hash.clone());
        let content_hash = compute_record_hash(&event, &prev_hash);

        tracing::debug!(
            event_id = %event.id.0,
            tenant_id = %event.tenant_id,
            hash = %content_hash,
            "Audit event recorded"
        );

        self.records.push(AuditRecord {
            event,
            prev_hash,
            content_hash,
        });
    }

    fn query_event_count(&self) -> usize {
        self.records.iter().filter(|r| r.event.is_query()).count()
    }

    fn event_count(&self) -> usize {
        self.records.len()
    }
}

/// Check whether an event matches the given query filters.
fn matches_query(event: &AuditEvent, query: &AuditQuery) -> bool {
    if let Some(tid) = &query.tenant_id {
        if &event.tenant_id != tid {
            return false;
        }
    }
    if let Some(actor) = &query.actor {
        if &event.actor != actor {
            return false;
        }
    }
    if query.queries_only && !event.is_query() {
        return false;
    }
    if let Some(from) = &query.from {
        if &event.timestamp < from {
            return false;
        }
    }
    if let Some(to) = &query.to {
        if &event.timestamp > to {
            return false;
        }
    }
    true
}
