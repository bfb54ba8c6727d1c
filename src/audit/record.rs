//! Structured audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Step of an operation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditPhase {
    /// Initial save of a new entity
    Create,
    /// Overall outcome of a `transition` call
    Transition,
    PreHook,
    Persist,
    PostHook,
    /// Overall outcome of a `reassign_discriminator` call
    Reassign,
    Detach,
    Attach,
}

impl AuditPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Transition => "transition",
            Self::PreHook => "pre_hook",
            Self::Persist => "persist",
            Self::PostHook => "post_hook",
            Self::Reassign => "reassign",
            Self::Detach => "detach",
            Self::Attach => "attach",
        }
    }
}

impl fmt::Display for AuditPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Succeeded,
    /// A hook or the transition table declined the operation
    Rejected,
    /// Something broke: persistence, a post-hook, an unknown variant
    Failed,
    Skipped,
}

/// One audit entry.
///
/// For transition phases `from` and `to` are status names. For the
/// reassignment phases they are the old and new discriminator tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub entity_id: String,
    pub discriminator: String,
    pub from: String,
    pub to: String,
    pub phase: AuditPhase,
    pub outcome: AuditOutcome,
    pub error_kind: Option<String>,
    pub detail: Option<String>,
    /// Set when an external side effect may have been orphaned and needs
    /// manual reconciliation.
    pub reconciliation: bool,
}

impl AuditRecord {
    /// Start a record; it is `Succeeded` until told otherwise.
    pub fn new(
        entity_id: impl Into<String>,
        discriminator: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        phase: AuditPhase,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            entity_id: entity_id.into(),
            discriminator: discriminator.into(),
            from: from.into(),
            to: to.into(),
            phase,
            outcome: AuditOutcome::Succeeded,
            error_kind: None,
            detail: None,
            reconciliation: false,
        }
    }

    pub fn rejected(self, kind: &str, detail: impl Into<String>) -> Self {
        self.with_outcome(AuditOutcome::Rejected, kind, detail)
    }

    pub fn failed(self, kind: &str, detail: impl Into<String>) -> Self {
        self.with_outcome(AuditOutcome::Failed, kind, detail)
    }

    /// Keep the `Succeeded` outcome but attach a non-fatal problem.
    pub fn warning(mut self, kind: &str, detail: impl Into<String>) -> Self {
        self.error_kind = Some(kind.to_string());
        self.detail = Some(detail.into());
        self
    }

    pub fn skipped(mut self, detail: impl Into<String>) -> Self {
        self.outcome = AuditOutcome::Skipped;
        self.detail = Some(detail.into());
        self
    }

    pub fn needs_reconciliation(mut self) -> Self {
        self.reconciliation = true;
        self
    }

    /// [`needs_reconciliation`](Self::needs_reconciliation) when `flag` is set.
    pub fn reconcile_if(self, flag: bool) -> Self {
        if flag {
            self.needs_reconciliation()
        } else {
            self
        }
    }

    fn with_outcome(mut self, outcome: AuditOutcome, kind: &str, detail: impl Into<String>) -> Self {
        self.outcome = outcome;
        self.error_kind = Some(kind.to_string());
        self.detail = Some(detail.into());
        self
    }
}
