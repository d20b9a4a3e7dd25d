//! The audit sink contract and a log-only implementation.

use fabric_core::events::{AuditAction, AuditEvent};

/// Destination for orchestrator audit events.
pub trait AuditSink: Send {
    /// Record one event.
    fn emit(&mut self, event: AuditEvent);

    /// Number of query events recorded so far, executed or denied.
    fn query_event_count(&self) -> usize;

    /// Total number of events recorded so far.
    fn event_count(&self) -> usize;
}

/// Writes every event to `tracing` and keeps only counters.
#[derive(Debug, Default)]
pub struct TracingAuditSink {
    events: usize,
    queries: usize,
}

impl TracingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for TracingAuditSink {
    fn emit(&mut self, event: AuditEvent) {
        self.events += 1;
        if event.is_query() {
            self.queries += 1;
        }

        match &event.action {
            AuditAction::LinkDenied { reason, .. } | AuditAction::QueryDenied { reason, .. } => {
                tracing::warn!(
                    event_id = %event.id.0,
                    tenant_id = %event.tenant_id,
                    actor = %event.actor,
                    reason = %reason,
                    "Fabric operation denied"
                );
            }
            action => {
                tracing::info!(
                    event_id = %event.id.0,
                    tenant_id = %event.tenant_id,
                    actor = %event.actor,
                    action = ?action,
                    "Fabric operation recorded"
                );
            }
        }
    }

    fn query_event_count(&self) -> usize {
        self.queries
    }

    fn event_count(&self) -> usize {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_sink_counts_queries() {
        let mut sink = TracingAuditSink::new();
        sink.emit(AuditEvent::new(
            "t-1",
            "dashboard",
            AuditAction::QueryExecuted {
                query_type: "node-by-id".to_string(),
                node_count: 1,
                edge_count: 0,
                execution_ms: 0,
            },
        ));
        sink.emit(AuditEvent::new(
            "t-1",
            "dashboard",
            AuditAction::QueryDenied {
                query_type: "node-by-id".to_string(),
                reason: "query policy is inactive".to_string(),
            },
        ));
        sink.emit(AuditEvent::new(
            "t-1",
            "ops",
            AuditAction::LinkDenied {
                from_entity_id: "a".to_string(),
                to_entity_id: "b".to_string(),
                edge_type: fabric_core::EdgeType::Triggers,
                reason: "denied".to_string(),
            },
        ));

        assert_eq!(sink.query_event_count(), 2);
        assert_eq!(sink.event_count(), 3);
    }
}
