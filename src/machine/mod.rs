//! The entity state machine.
//!
//! [`EntityMachine`] owns the status of every entity of one class. It is
//! the only code that changes a status, and it does so in a fixed order:
//!
//! ```text
//! 1. lock the entity id and load the record
//! 2. check (status, to) against the transition table   -> IllegalTransition
//! 3. resolve the variant from the discriminator         -> UnknownVariant
//! 4. run the pre-hook                                    -> HookRejected
//! 5. set the status and save once                        -> PersistenceFailed
//! 6. run the post-hook                                   -> PostHookFailed (warning)
//! ```
//!
//! Steps 2 to 5 leave the stored record untouched when they fail. Step 6
//! never rolls back: by then the status and the pre-hook's side effects are
//! visible to everyone else.

mod error;
pub(crate) mod locks;
mod report;

pub use error::{CreateError, PostHookFailed, ReassignError, TransitionError};
pub use report::{ReassignReport, TransitionReport};

use crate::audit::{AuditPhase, AuditRecord, AuditReporter};
use crate::config::MachineConfig;
use crate::core::{Discriminator, Entity, Status, TransitionTable};
use crate::persistence::{PersistenceError, Repository};
use crate::strategy::{HookRejection, Resolver};
use locks::EntityLocks;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs transitions and reassignments for one entity class.
///
/// Build it with [`MachineBuilder`](crate::builder::MachineBuilder). The
/// machine is `Send + Sync`; share it behind an `Arc` and call it from as
/// many tasks as needed. Operations on the same entity id are serialized,
/// operations on different ids run in parallel.
pub struct EntityMachine<E: Entity> {
    pub(crate) table: TransitionTable<E::Status>,
    pub(crate) resolver: Resolver<E>,
    pub(crate) repository: Arc<dyn Repository<E>>,
    pub(crate) audit: AuditReporter,
    pub(crate) config: MachineConfig,
    pub(crate) locks: EntityLocks<E::Id>,
}

impl<E: Entity> EntityMachine<E> {
    pub fn table(&self) -> &TransitionTable<E::Status> {
        &self.table
    }

    pub fn resolver(&self) -> &Resolver<E> {
        &self.resolver
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Check the transition table (pure). Says nothing about hooks.
    pub fn can_transition(&self, from: E::Status, to: E::Status) -> bool {
        self.table.is_allowed(from, to)
    }

    pub fn allowed_targets(&self, from: E::Status) -> Vec<E::Status> {
        self.table.targets(from)
    }

    /// Store a new entity.
    ///
    /// The entity must be in the table's initial status and carry a
    /// registered discriminator. No hooks run.
    pub async fn create(&self, entity: E) -> Result<(), CreateError> {
        let _guard = self.locks.acquire(entity.id()).await;
        let record = AuditRecord::new(
            entity.id().to_string(),
            entity.discriminator().as_str(),
            "",
            entity.status().name(),
            AuditPhase::Create,
        );

        let result = self.store_new(&entity).await;
        match &result {
            Ok(()) => self.audit.operation(record),
            Err(err @ CreateError::PersistenceFailed(_)) => {
                self.audit.operation(record.failed(err.kind(), err.to_string()));
            }
            Err(err) => self.audit.operation(record.rejected(err.kind(), err.to_string())),
        }
        result
    }

    async fn store_new(&self, entity: &E) -> Result<(), CreateError> {
        let initial = self.table.initial();
        if entity.status() != initial {
            return Err(CreateError::NotInitialStatus {
                expected: initial.name().to_string(),
                actual: entity.status().name().to_string(),
            });
        }
        self.resolver.registry().lookup(entity.discriminator())?;
        match self.repository.load(entity.id()).await {
            Ok(_) => {
                return Err(CreateError::AlreadyExists(entity.id().to_string()));
            }
            Err(PersistenceError::NotFound(_)) => {}
            Err(err) => return Err(CreateError::PersistenceFailed(err)),
        }
        self.repository
            .save(entity)
            .await
            .map_err(CreateError::PersistenceFailed)
    }

    /// Move the entity to `to`, with the configured hook timeouts.
    pub async fn transition(
        &self,
        id: &E::Id,
        to: E::Status,
    ) -> Result<TransitionReport<E::Status>, TransitionError> {
        let pre = self.config.hook_timeout();
        let post = self.config.post_hook_timeout();
        self.run_transition(id, to, pre, post).await
    }

    /// Move the entity to `to`, giving each hook at most `timeout`.
    ///
    /// A pre-hook that runs out of time is cancelled and reported as
    /// `HookRejected(Timeout)`; the status is not touched.
    pub async fn transition_within(
        &self,
        id: &E::Id,
        to: E::Status,
        timeout: Duration,
    ) -> Result<TransitionReport<E::Status>, TransitionError> {
        self.run_transition(id, to, Some(timeout), Some(timeout))
            .await
    }

    async fn run_transition(
        &self,
        id: &E::Id,
        to: E::Status,
        pre_timeout: Option<Duration>,
        post_timeout: Option<Duration>,
    ) -> Result<TransitionReport<E::Status>, TransitionError> {
        let _guard = self.locks.acquire(id).await;

        let entity_id = id.to_string();
        let mut entity = self.repository.load(id).await.map_err(|source| {
            let err = TransitionError::LoadFailed {
                entity_id: entity_id.clone(),
                source,
            };
            self.audit.operation(
                AuditRecord::new(&entity_id, "", "", to.name(), AuditPhase::Transition)
                    .failed(err.kind(), err.to_string()),
            );
            err
        })?;

        let from = entity.status();
        let discriminator = entity.discriminator().clone();
        let record = |phase| {
            AuditRecord::new(
                &entity_id,
                discriminator.as_str(),
                from.name(),
                to.name(),
                phase,
            )
        };

        tracing::debug!(
            entity_id = %entity_id,
            discriminator = %discriminator,
            from = from.name(),
            to = to.name(),
            "transition requested"
        );

        if !self.table.is_allowed(from, to) {
            let err = TransitionError::IllegalTransition {
                from: from.name().to_string(),
                to: to.name().to_string(),
            };
            self.audit
                .operation(record(AuditPhase::Transition).rejected(err.kind(), err.to_string()));
            return Err(err);
        }

        let strategy = match self.resolver.resolve(&entity) {
            Ok(strategy) => strategy,
            Err(unknown) => {
                let err = TransitionError::from(unknown);
                self.audit
                    .operation(record(AuditPhase::Transition).failed(err.kind(), err.to_string()));
                return Err(err);
            }
        };

        if let Err(reason) = run_hook(strategy.before(to), pre_timeout).await {
            // A cancelled hook may already have reached its collaborator.
            let orphaned = reason.is_timeout();
            self.audit.step(
                record(AuditPhase::PreHook)
                    .rejected(reason.kind(), reason.to_string())
                    .reconcile_if(orphaned),
            );
            let err = TransitionError::HookRejected(reason);
            self.audit.operation(
                record(AuditPhase::Transition)
                    .rejected(err.kind(), err.to_string())
                    .reconcile_if(orphaned),
            );
            return Err(err);
        }
        self.audit.step(record(AuditPhase::PreHook));

        entity.set_status(to);
        if let Err(source) = self.repository.save(&entity).await {
            self.audit.step(
                record(AuditPhase::Persist)
                    .failed("persistence_failed", source.to_string())
                    .needs_reconciliation(),
            );
            let err = TransitionError::PersistenceFailed {
                to: to.name().to_string(),
                source,
            };
            self.audit.operation(
                record(AuditPhase::Transition)
                    .failed(err.kind(), err.to_string())
                    .needs_reconciliation(),
            );
            return Err(err);
        }
        self.audit.step(record(AuditPhase::Persist));

        let post_hook = match run_hook(strategy.after(to), post_timeout).await {
            Ok(()) => {
                self.audit.step(record(AuditPhase::PostHook));
                Ok(())
            }
            Err(reason) => {
                self.audit
                    .step(record(AuditPhase::PostHook).failed(reason.kind(), reason.to_string()));
                Err(PostHookFailed {
                    to: to.name().to_string(),
                    reason,
                })
            }
        };

        let outcome = match &post_hook {
            Ok(()) => record(AuditPhase::Transition),
            Err(warning) => {
                record(AuditPhase::Transition).warning("post_hook_failed", warning.to_string())
            }
        };
        self.audit.operation(outcome);

        Ok(TransitionReport {
            entity_id,
            from,
            to,
            discriminator,
            post_hook,
        })
    }

    /// Permanently switch the variant governing an entity.
    ///
    /// Runs `on_detach` on the outgoing variant, then `on_attach` on the
    /// incoming one, then saves the new token. Either hook can veto the
    /// change, in which case nothing is saved. If the current token is no
    /// longer registered the detach step is skipped, so a misconfigured
    /// entity can be repaired. The status is never touched.
    pub async fn reassign_discriminator(
        &self,
        id: &E::Id,
        token: impl Into<Discriminator>,
    ) -> Result<ReassignReport, ReassignError> {
        let token = token.into();
        let _guard = self.locks.acquire(id).await;

        let entity_id = id.to_string();
        let mut entity = self.repository.load(id).await.map_err(|source| {
            let err = ReassignError::LoadFailed {
                entity_id: entity_id.clone(),
                source,
            };
            self.audit.operation(
                AuditRecord::new(&entity_id, "", "", token.as_str(), AuditPhase::Reassign)
                    .failed(err.kind(), err.to_string()),
            );
            err
        })?;

        let previous = entity.discriminator().clone();
        let record = |phase| {
            AuditRecord::new(
                &entity_id,
                previous.as_str(),
                previous.as_str(),
                token.as_str(),
                phase,
            )
        };

        let mut rebound = entity.clone();
        rebound.set_discriminator(token.clone());
        let incoming = match self.resolver.resolve_as(&rebound, &token) {
            Ok(strategy) => strategy,
            Err(unknown) => {
                let err = ReassignError::from(unknown);
                self.audit
                    .operation(record(AuditPhase::Reassign).failed(err.kind(), err.to_string()));
                return Err(err);
            }
        };

        if previous == token {
            self.audit
                .operation(record(AuditPhase::Reassign).skipped("discriminator unchanged"));
            return Ok(ReassignReport {
                entity_id,
                from: previous.clone(),
                to: token,
                changed: false,
                detach_skipped: false,
            });
        }

        let timeout = self.config.hook_timeout();
        let detach_skipped = match self.resolver.resolve(&entity) {
            Ok(outgoing) => {
                if let Err(reason) = run_hook(outgoing.on_detach(), timeout).await {
                    let orphaned = reason.is_timeout();
                    self.audit.step(
                        record(AuditPhase::Detach)
                            .rejected(reason.kind(), reason.to_string())
                            .reconcile_if(orphaned),
                    );
                    let err = ReassignError::DetachRejected(reason);
                    self.audit.operation(
                        record(AuditPhase::Reassign)
                            .rejected(err.kind(), err.to_string())
                            .reconcile_if(orphaned),
                    );
                    return Err(err);
                }
                self.audit.step(record(AuditPhase::Detach));
                false
            }
            Err(unknown) => {
                self.audit
                    .step(record(AuditPhase::Detach).skipped(unknown.to_string()));
                true
            }
        };

        if let Err(reason) = run_hook(incoming.on_attach(), timeout).await {
            let orphaned = reason.is_timeout();
            // The outgoing variant already let go of its resources.
            self.audit.step(
                record(AuditPhase::Attach)
                    .rejected(reason.kind(), reason.to_string())
                    .reconcile_if(orphaned || !detach_skipped),
            );
            let err = ReassignError::AttachRejected(reason);
            self.audit.operation(
                record(AuditPhase::Reassign)
                    .rejected(err.kind(), err.to_string())
                    .reconcile_if(orphaned),
            );
            return Err(err);
        }
        self.audit.step(record(AuditPhase::Attach));

        entity.set_discriminator(token.clone());
        if let Err(source) = self.repository.save(&entity).await {
            self.audit.step(
                record(AuditPhase::Persist)
                    .failed("persistence_failed", source.to_string())
                    .needs_reconciliation(),
            );
            let err = ReassignError::PersistenceFailed {
                token: token.to_string(),
                source,
            };
            self.audit.operation(
                record(AuditPhase::Reassign)
                    .failed(err.kind(), err.to_string())
                    .needs_reconciliation(),
            );
            return Err(err);
        }
        self.audit.step(record(AuditPhase::Persist));
        self.audit.operation(record(AuditPhase::Reassign));

        Ok(ReassignReport {
            entity_id,
            from: previous.clone(),
            to: token,
            changed: true,
            detach_skipped,
        })
    }
}

/// Await a hook, cancelling it once `timeout` has elapsed.
async fn run_hook<F>(hook: F, timeout: Option<Duration>) -> Result<(), HookRejection>
where
    F: Future<Output = Result<(), HookRejection>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, hook)
            .await
            .unwrap_or(Err(HookRejection::Timeout(limit))),
        None => hook.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditOutcome, MemoryAuditSink};
    use crate::test_support::{
        configured_machine, machine, machine_with, ticket, FailingSaves, HookLog, TicketStatus,
    };

    fn with_hook_timeout(ms: u64) -> MachineConfig {
        MachineConfig {
            hook_timeout_ms: Some(ms),
            ..MachineConfig::default()
        }
    }

    #[tokio::test]
    async fn legal_transition_runs_both_hooks_and_saves() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let report = machine.transition(&1, TicketStatus::Open).await.unwrap();

        assert_eq!(report.from, TicketStatus::Draft);
        assert_eq!(report.to, TicketStatus::Open);
        assert!(report.is_clean());
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Open);
        assert_eq!(log.entries(), vec!["plain:before:Open", "plain:after:Open"]);
    }

    #[tokio::test]
    async fn illegal_transition_leaves_entity_untouched() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let err = machine
            .transition(&1, TicketStatus::Draft)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: "Draft".into(),
                to: "Draft".into()
            }
        );
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert!(log.entries().is_empty());
        assert_eq!(audit.records()[0].outcome, AuditOutcome::Rejected);
    }

    #[tokio::test]
    async fn final_status_rejects_further_transitions() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        let mut closed = ticket(1, "plain");
        closed.status = TicketStatus::Closed;
        repository.insert(closed);

        for target in TicketStatus::ALL {
            let err = machine.transition(&1, *target).await.unwrap_err();
            assert!(matches!(err, TransitionError::IllegalTransition { .. }));
        }
    }

    #[tokio::test]
    async fn unknown_variant_fails_before_any_hook() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "unregistered-token"));

        let err = machine
            .transition(&1, TicketStatus::Open)
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::UnknownVariant(_)));
        assert!(log.entries().is_empty());
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert_eq!(audit.records()[0].error_kind.as_deref(), Some("unknown_variant"));
    }

    #[tokio::test]
    async fn pre_hook_rejection_aborts_without_post_hook() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "picky"));

        let err = machine
            .transition(&1, TicketStatus::Open)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransitionError::HookRejected(HookRejection::Precondition(_))
        ));
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert_eq!(log.entries(), vec!["picky:before:Open"]);
    }

    #[tokio::test]
    async fn post_hook_failure_keeps_the_new_status() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "flaky"));

        let report = machine.transition(&1, TicketStatus::Open).await.unwrap();

        assert!(!report.is_clean());
        assert!(matches!(
            report.warning().map(|w| &w.reason),
            Some(HookRejection::External(_))
        ));
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Open);

        let last = audit.records().pop().unwrap();
        assert_eq!(last.phase, AuditPhase::Transition);
        assert_eq!(last.outcome, AuditOutcome::Succeeded);
        assert_eq!(last.error_kind.as_deref(), Some("post_hook_failed"));
    }

    #[tokio::test]
    async fn persistence_failure_skips_post_hook_and_flags_reconciliation() {
        let log = HookLog::default();
        let repository = Arc::new(FailingSaves::new());
        repository.insert(ticket(1, "plain"));
        let audit = Arc::new(MemoryAuditSink::new());
        let machine = machine_with(&log, repository.clone(), audit.clone());

        let err = machine
            .transition(&1, TicketStatus::Open)
            .await
            .unwrap_err();

        assert!(matches!(err, TransitionError::PersistenceFailed { .. }));
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert_eq!(log.entries(), vec!["plain:before:Open"]);
        assert_eq!(audit.reconciliation_cases().len(), 2);
    }

    #[tokio::test]
    async fn missing_entity_is_a_load_failure() {
        let (machine, _, _) = machine(&HookLog::default());
        let err = machine
            .transition(&99, TicketStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, TransitionError::LoadFailed { .. }));
    }

    #[tokio::test]
    async fn slow_pre_hook_times_out_without_mutation() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "slow"));

        let err = machine
            .transition_within(&1, TicketStatus::Open, Duration::from_millis(20))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransitionError::HookRejected(HookRejection::Timeout(Duration::from_millis(20)))
        );
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn timed_out_pre_hook_is_flagged_for_reconciliation() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "slow"));

        machine
            .transition_within(&1, TicketStatus::Open, Duration::from_millis(20))
            .await
            .unwrap_err();

        let flagged: Vec<_> = audit
            .reconciliation_cases()
            .into_iter()
            .map(|r| (r.phase, r.error_kind))
            .collect();
        assert_eq!(
            flagged,
            vec![
                (AuditPhase::PreHook, Some("timeout".to_string())),
                (AuditPhase::Transition, Some("hook_rejected".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn configured_pre_hook_timeout_applies_to_transition() {
        let log = HookLog::default();
        let (machine, repository, audit) = configured_machine(&log, with_hook_timeout(20));
        repository.insert(ticket(1, "slow"));

        let err = machine
            .transition(&1, TicketStatus::Open)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransitionError::HookRejected(HookRejection::Timeout(Duration::from_millis(20)))
        );
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);
        assert!(!audit.reconciliation_cases().is_empty());
    }

    #[tokio::test]
    async fn slow_post_hook_is_a_warning() {
        let log = HookLog::default();
        let (machine, repository, audit) = configured_machine(&log, with_hook_timeout(20));
        repository.insert(ticket(1, "lagging"));

        let report = machine.transition(&1, TicketStatus::Open).await.unwrap();

        assert_eq!(
            report.warning().map(|w| &w.reason),
            Some(&HookRejection::Timeout(Duration::from_millis(20)))
        );
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Open);
        assert_eq!(log.entries(), vec!["lagging:before:Open"]);
        assert!(audit.reconciliation_cases().is_empty());

        let last = audit.records().pop().unwrap();
        assert_eq!(last.outcome, AuditOutcome::Succeeded);
        assert_eq!(last.error_kind.as_deref(), Some("post_hook_failed"));
    }

    #[tokio::test]
    async fn create_requires_initial_status_and_known_variant() {
        let (machine, repository, _) = machine(&HookLog::default());

        let mut open = ticket(1, "plain");
        open.status = TicketStatus::Open;
        assert!(matches!(
            machine.create(open).await,
            Err(CreateError::NotInitialStatus { .. })
        ));
        assert!(matches!(
            machine.create(ticket(2, "gold")).await,
            Err(CreateError::UnknownVariant(_))
        ));

        machine.create(ticket(3, "plain")).await.unwrap();
        assert!(matches!(
            machine.create(ticket(3, "plain")).await,
            Err(CreateError::AlreadyExists(_))
        ));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn reassignment_runs_detach_then_attach() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let report = machine.reassign_discriminator(&1, "other").await.unwrap();
        assert!(report.changed);
        assert!(!report.detach_skipped);
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "other");
        assert_eq!(repository.get(&1).unwrap().status, TicketStatus::Draft);

        machine.transition(&1, TicketStatus::Open).await.unwrap();
        assert_eq!(
            log.entries(),
            vec![
                "plain:detach",
                "other:attach",
                "other:before:Open",
                "other:after:Open"
            ]
        );
    }

    #[tokio::test]
    async fn reassignment_to_same_token_is_a_no_op() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let report = machine.reassign_discriminator(&1, "plain").await.unwrap();
        assert!(!report.changed);
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn reassignment_to_unknown_token_is_rejected() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let err = machine
            .reassign_discriminator(&1, "gold")
            .await
            .unwrap_err();
        assert!(matches!(err, ReassignError::UnknownVariant(_)));
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "plain");
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn attach_rejection_keeps_old_token() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "plain"));

        let err = machine
            .reassign_discriminator(&1, "clingy")
            .await
            .unwrap_err();

        assert!(matches!(err, ReassignError::AttachRejected(_)));
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "plain");
        assert_eq!(audit.reconciliation_cases().len(), 1);
    }

    #[tokio::test]
    async fn detach_rejection_keeps_old_token() {
        let log = HookLog::default();
        let (machine, repository, audit) = machine(&log);
        repository.insert(ticket(1, "grudging"));

        let err = machine
            .reassign_discriminator(&1, "plain")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReassignError::DetachRejected(HookRejection::Precondition(_))
        ));
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "grudging");
        assert_eq!(log.entries(), vec!["grudging:detach"]);
        assert!(audit.reconciliation_cases().is_empty());
    }

    #[tokio::test]
    async fn timed_out_detach_is_flagged_for_reconciliation() {
        let log = HookLog::default();
        let (machine, repository, audit) = configured_machine(&log, with_hook_timeout(20));
        repository.insert(ticket(1, "slow"));

        let err = machine
            .reassign_discriminator(&1, "plain")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ReassignError::DetachRejected(HookRejection::Timeout(Duration::from_millis(20)))
        );
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "slow");
        let flagged: Vec<_> = audit
            .reconciliation_cases()
            .into_iter()
            .map(|r| r.phase)
            .collect();
        assert_eq!(flagged, vec![AuditPhase::Detach, AuditPhase::Reassign]);
    }

    #[tokio::test]
    async fn reassignment_save_failure_keeps_old_token_and_flags_reconciliation() {
        let log = HookLog::default();
        let repository = Arc::new(FailingSaves::new());
        repository.insert(ticket(1, "plain"));
        let audit = Arc::new(MemoryAuditSink::new());
        let machine = machine_with(&log, repository.clone(), audit.clone());

        let err = machine
            .reassign_discriminator(&1, "other")
            .await
            .unwrap_err();

        assert!(matches!(err, ReassignError::PersistenceFailed { .. }));
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "plain");
        assert_eq!(log.entries(), vec!["plain:detach", "other:attach"]);
        let flagged: Vec<_> = audit
            .reconciliation_cases()
            .into_iter()
            .map(|r| r.phase)
            .collect();
        assert_eq!(flagged, vec![AuditPhase::Persist, AuditPhase::Reassign]);
    }

    #[tokio::test]
    async fn unregistered_old_token_skips_detach() {
        let log = HookLog::default();
        let (machine, repository, _) = machine(&log);
        repository.insert(ticket(1, "retired"));

        let report = machine.reassign_discriminator(&1, "plain").await.unwrap();

        assert!(report.detach_skipped);
        assert_eq!(log.entries(), vec!["plain:attach"]);
        assert_eq!(repository.get(&1).unwrap().kind.as_str(), "plain");
    }

    #[test]
    fn table_queries_are_exposed() {
        let (machine, _, _) = machine(&HookLog::default());
        assert!(machine.can_transition(TicketStatus::Draft, TicketStatus::Open));
        assert!(!machine.can_transition(TicketStatus::Open, TicketStatus::Draft));
        assert_eq!(
            machine.allowed_targets(TicketStatus::Open),
            vec![TicketStatus::Closed]
        );
    }
}
