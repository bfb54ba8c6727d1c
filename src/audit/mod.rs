//! Audit trail for transitions, hooks and reassignments.
//!
//! Every transition attempt and every hook invocation produces an
//! [`AuditRecord`]. The records are what an operator reads when an entity
//! ended up in a status whose post-hook never completed, or when a saved
//! status is missing behind an external charge that already went through.
//!
//! The default sink is [`TracingAuditSink`]; swap in a
//! [`MemoryAuditSink`] (or your own [`AuditSink`]) through
//! [`MachineBuilder::audit`](crate::builder::MachineBuilder::audit).

mod record;
mod sink;

pub use record::{AuditOutcome, AuditPhase, AuditRecord};
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};

use std::sync::Arc;

/// Filters and forwards records to the configured sink.
#[derive(Clone)]
pub(crate) struct AuditReporter {
    sink: Arc<dyn AuditSink>,
    hooks: bool,
}

impl AuditReporter {
    pub(crate) fn new(sink: Arc<dyn AuditSink>, hooks: bool) -> Self {
        Self { sink, hooks }
    }

    /// Report the overall outcome of an operation. Always recorded.
    pub(crate) fn operation(&self, record: AuditRecord) {
        self.sink.record(record);
    }

    /// Report a single step. Successful hook steps are dropped when hook
    /// auditing is turned off; failures are always recorded.
    pub(crate) fn step(&self, record: AuditRecord) {
        let is_hook = matches!(
            record.phase,
            AuditPhase::PreHook | AuditPhase::PostHook | AuditPhase::Detach | AuditPhase::Attach
        );
        if is_hook && !self.hooks && record.outcome == AuditOutcome::Succeeded {
            return;
        }
        self.sink.record(record);
    }
}
