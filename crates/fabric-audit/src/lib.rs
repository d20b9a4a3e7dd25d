//! Fabric audit: sinks for orchestrator audit events.
//!
//! The orchestrator emits one `AuditEvent` per register, link, and query
//! operation. Sinks implement `AuditSink`; the in-memory sink chains each
//! record to its predecessor with a BLAKE3 hash so any later modification of
//! the log is detectable.

pub mod hash;
pub mod memory;
pub mod sink;

pub use memory::{AuditQuery, AuditRecord, MemoryAuditSink};
pub use sink::{AuditSink, TracingAuditSink};

/// Errors raised when inspecting an audit log.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("Audit chain broken at record {index}: stored hash does not match content")]
    ChainBroken { index: usize },

    #[error("Audit chain broken at record {index}: previous-hash link does not match")]
    LinkMismatch { index: usize },
}
