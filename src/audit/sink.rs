//! Audit sinks receiving records from the machine.

use super::record::{AuditOutcome, AuditRecord};
use parking_lot::RwLock;
use tracing::Level;

/// Destination for audit records.
///
/// `record` is called inline while the entity lock is held, so sinks
/// should not block for long.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Emits every record as a `tracing` event.
///
/// Successes go out at `info` and skips at `debug`. Rejections, failures
/// and successes that carry a warning go out at `warn`. Anything flagged
/// for reconciliation goes out at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Level a record is emitted at.
    pub fn level(record: &AuditRecord) -> Level {
        match record.outcome {
            _ if record.reconciliation => Level::ERROR,
            AuditOutcome::Succeeded if record.error_kind.is_some() => Level::WARN,
            AuditOutcome::Succeeded => Level::INFO,
            AuditOutcome::Skipped => Level::DEBUG,
            AuditOutcome::Rejected | AuditOutcome::Failed => Level::WARN,
        }
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, r: AuditRecord) {
        let summary = match r.outcome {
            _ if r.reconciliation => "needs reconciliation",
            AuditOutcome::Succeeded if r.error_kind.is_some() => "succeeded with warning",
            AuditOutcome::Succeeded => "succeeded",
            AuditOutcome::Skipped => "skipped",
            AuditOutcome::Rejected => "rejected",
            AuditOutcome::Failed => "failed",
        };

        macro_rules! emit {
            ($level:expr) => {
                tracing::event!(
                    target: "modality::audit",
                    $level,
                    record_id = %r.id,
                    entity_id = %r.entity_id,
                    discriminator = %r.discriminator,
                    from = %r.from,
                    to = %r.to,
                    phase = %r.phase,
                    outcome = ?r.outcome,
                    error_kind = ?r.error_kind,
                    detail = ?r.detail,
                    reconciliation = r.reconciliation,
                    "{} {}",
                    r.phase,
                    summary
                )
            };
        }

        // `event!` needs a constant level per callsite.
        let level = Self::level(&r);
        if level == Level::ERROR {
            emit!(Level::ERROR)
        } else if level == Level::WARN {
            emit!(Level::WARN)
        } else if level == Level::INFO {
            emit!(Level::INFO)
        } else {
            emit!(Level::DEBUG)
        }
    }
}

/// In-memory sink for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    pub fn for_entity(&self, entity_id: &str) -> Vec<AuditRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Records flagged for manual reconciliation.
    pub fn reconciliation_cases(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.reconciliation)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records.write().push(record);
    }
}
