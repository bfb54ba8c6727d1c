//! Shared fixtures for unit tests: a minimal entity class and recording
//! strategy variants.

use crate::audit::MemoryAuditSink;
use crate::builder::{MachineBuilder, RegistryBuilder, TransitionTableBuilder};
use crate::config::MachineConfig;
use crate::core::{Discriminator, Entity, TransitionTable};
use crate::machine::EntityMachine;
use crate::persistence::{MemoryRepository, PersistenceError, Repository};
use crate::status_enum;
use crate::strategy::{HookRejection, Strategy, StrategyRegistry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

status_enum! {
    pub enum TicketStatus {
        Draft,
        Open,
        Scheduled,
        Closed,
    }
    final: [Closed]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: u32,
    pub status: TicketStatus,
    pub kind: Discriminator,
}

impl Entity for Ticket {
    type Id = u32;
    type Status = TicketStatus;

    fn id(&self) -> &u32 {
        &self.id
    }

    fn status(&self) -> TicketStatus {
        self.status
    }

    fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }

    fn discriminator(&self) -> &Discriminator {
        &self.kind
    }

    fn set_discriminator(&mut self, discriminator: Discriminator) {
        self.kind = discriminator;
    }
}

/// A draft ticket.
pub fn ticket(id: u32, kind: &str) -> Ticket {
    Ticket {
        id,
        status: TicketStatus::Draft,
        kind: Discriminator::from(kind),
    }
}

pub fn ticket_table() -> TransitionTable<TicketStatus> {
    use TicketStatus::*;

    TransitionTableBuilder::new()
        .initial(Draft)
        .allow_many(Draft, &[Open, Scheduled, Closed])
        .allow(Scheduled, Open)
        .allow(Open, Closed)
        .build()
        .unwrap()
}

/// Hook invocations, in order, shared across variants.
#[derive(Clone, Default)]
pub struct HookLog(Arc<Mutex<Vec<String>>>);

impl HookLog {
    pub fn push(&self, entry: String) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Variant that logs every hook as `label:hook[:Status]`.
pub struct Recorder {
    label: &'static str,
    log: HookLog,
    reject_before: bool,
    fail_after: bool,
    reject_attach: bool,
    reject_detach: bool,
    delay: Option<Duration>,
    after_delay: Option<Duration>,
}

impl Recorder {
    pub fn new(label: &'static str, log: HookLog) -> Self {
        Self {
            label,
            log,
            reject_before: false,
            fail_after: false,
            reject_attach: false,
            reject_detach: false,
            delay: None,
            after_delay: None,
        }
    }

    pub fn rejecting_before(mut self) -> Self {
        self.reject_before = true;
        self
    }

    pub fn failing_after(mut self) -> Self {
        self.fail_after = true;
        self
    }

    pub fn rejecting_attach(mut self) -> Self {
        self.reject_attach = true;
        self
    }

    pub fn rejecting_detach(mut self) -> Self {
        self.reject_detach = true;
        self
    }

    /// Sleep before logging in `before` and `on_detach`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep before logging in `after`.
    pub fn delayed_after(mut self, delay: Duration) -> Self {
        self.after_delay = Some(delay);
        self
    }
}

#[async_trait]
impl Strategy<Ticket> for Recorder {
    async fn before(&self, to: TicketStatus) -> Result<(), HookRejection> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(format!("{}:before:{:?}", self.label, to));
        if self.reject_before {
            return Err(HookRejection::Precondition(format!(
                "{} refuses {:?}",
                self.label, to
            )));
        }
        Ok(())
    }

    async fn after(&self, to: TicketStatus) -> Result<(), HookRejection> {
        if let Some(delay) = self.after_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(format!("{}:after:{:?}", self.label, to));
        if self.fail_after {
            return Err(HookRejection::External("downstream unavailable".into()));
        }
        Ok(())
    }

    async fn on_detach(&self) -> Result<(), HookRejection> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(format!("{}:detach", self.label));
        if self.reject_detach {
            return Err(HookRejection::Precondition(format!(
                "{} cannot be detached",
                self.label
            )));
        }
        Ok(())
    }

    async fn on_attach(&self) -> Result<(), HookRejection> {
        self.log.push(format!("{}:attach", self.label));
        if self.reject_attach {
            return Err(HookRejection::Precondition(format!(
                "{} cannot be attached",
                self.label
            )));
        }
        Ok(())
    }
}

/// Eight variants over one log: `plain`, `other`, `picky` (rejects every
/// pre-hook), `flaky` (every post-hook fails), `slow` (pre-hook and detach
/// sleep 500ms), `clingy` (rejects attach), `grudging` (rejects detach) and
/// `lagging` (post-hook sleeps 500ms).
pub fn recording_registry(log: &HookLog) -> StrategyRegistry<Ticket> {
    let variants: [(&'static str, fn(Recorder) -> Recorder); 8] = [
        ("plain", |r| r),
        ("other", |r| r),
        ("picky", Recorder::rejecting_before),
        ("flaky", Recorder::failing_after),
        ("slow", |r| r.delayed(Duration::from_millis(500))),
        ("clingy", Recorder::rejecting_attach),
        ("grudging", Recorder::rejecting_detach),
        ("lagging", |r| r.delayed_after(Duration::from_millis(500))),
    ];

    variants
        .into_iter()
        .fold(RegistryBuilder::new(), |builder, (label, configure)| {
            let log = log.clone();
            builder.register(label, move |_: &Ticket| {
                configure(Recorder::new(label, log.clone()))
            })
        })
        .build()
        .unwrap()
}

/// A ticket machine over [`recording_registry`] with in-memory storage and
/// audit.
pub fn machine(
    log: &HookLog,
) -> (
    EntityMachine<Ticket>,
    Arc<MemoryRepository<Ticket>>,
    Arc<MemoryAuditSink>,
) {
    let repository = Arc::new(MemoryRepository::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let machine = MachineBuilder::new()
        .table(ticket_table())
        .registry(recording_registry(log))
        .repository(repository.clone())
        .audit(audit.clone())
        .build()
        .unwrap();
    (machine, repository, audit)
}

/// Like [`machine`], with `config` applied.
pub fn configured_machine(
    log: &HookLog,
    config: MachineConfig,
) -> (
    EntityMachine<Ticket>,
    Arc<MemoryRepository<Ticket>>,
    Arc<MemoryAuditSink>,
) {
    let repository = Arc::new(MemoryRepository::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let machine = MachineBuilder::new()
        .table(ticket_table())
        .registry(recording_registry(log))
        .repository(repository.clone())
        .audit(audit.clone())
        .config(config)
        .build()
        .unwrap();
    (machine, repository, audit)
}

pub fn machine_with<R>(
    log: &HookLog,
    repository: Arc<R>,
    audit: Arc<MemoryAuditSink>,
) -> EntityMachine<Ticket>
where
    R: Repository<Ticket> + 'static,
{
    MachineBuilder::new()
        .table(ticket_table())
        .registry(recording_registry(log))
        .repository(repository)
        .audit(audit)
        .build()
        .unwrap()
}

/// Repository whose loads work and whose saves always fail.
#[derive(Default)]
pub struct FailingSaves {
    inner: MemoryRepository<Ticket>,
}

impl FailingSaves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: Ticket) {
        self.inner.insert(entity);
    }

    pub fn get(&self, id: &u32) -> Option<Ticket> {
        self.inner.get(id)
    }
}

#[async_trait]
impl Repository<Ticket> for FailingSaves {
    async fn load(&self, id: &u32) -> Result<Ticket, PersistenceError> {
        self.inner.load(id).await
    }

    async fn save(&self, _entity: &Ticket) -> Result<(), PersistenceError> {
        Err(PersistenceError::Storage("disk full".into()))
    }
}
