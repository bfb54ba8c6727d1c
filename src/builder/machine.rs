//! Builder for constructing entity machines.

use crate::audit::{AuditReporter, AuditSink, TracingAuditSink};
use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::{Entity, TransitionTable};
use crate::machine::locks::EntityLocks;
use crate::machine::EntityMachine;
use crate::persistence::Repository;
use crate::strategy::{Resolver, StrategyRegistry};
use std::sync::Arc;

/// Builder for constructing an [`EntityMachine`] with a fluent API.
pub struct MachineBuilder<E: Entity> {
    table: Option<TransitionTable<E::Status>>,
    registry: Option<Arc<StrategyRegistry<E>>>,
    repository: Option<Arc<dyn Repository<E>>>,
    audit: Option<Arc<dyn AuditSink>>,
    config: MachineConfig,
}

impl<E: Entity> MachineBuilder<E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            table: None,
            registry: None,
            repository: None,
            audit: None,
            config: MachineConfig::default(),
        }
    }

    /// Set the transition table (required).
    pub fn table(mut self, table: TransitionTable<E::Status>) -> Self {
        self.table = Some(table);
        self
    }

    /// Set the strategy registry (required).
    pub fn registry(mut self, registry: impl Into<Arc<StrategyRegistry<E>>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Set the persistence collaborator (required).
    pub fn repository<R>(mut self, repository: Arc<R>) -> Self
    where
        R: Repository<E> + 'static,
    {
        self.repository = Some(repository as Arc<dyn Repository<E>>);
        self
    }

    /// Set the audit sink. Defaults to [`TracingAuditSink`].
    pub fn audit<A>(mut self, sink: Arc<A>) -> Self
    where
        A: AuditSink + 'static,
    {
        self.audit = Some(sink as Arc<dyn AuditSink>);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the machine.
    /// Returns an error if required fields are missing or the config is
    /// invalid.
    pub fn build(self) -> Result<EntityMachine<E>, BuildError> {
        self.config.validate()?;
        let table = self.table.ok_or(BuildError::MissingTable)?;
        let registry = self.registry.ok_or(BuildError::MissingRegistry)?;
        let repository = self.repository.ok_or(BuildError::MissingRepository)?;
        let sink = self
            .audit
            .unwrap_or_else(|| Arc::new(TracingAuditSink) as Arc<dyn AuditSink>);

        Ok(EntityMachine {
            table,
            resolver: Resolver::new(registry),
            repository,
            audit: AuditReporter::new(sink, self.config.audit_hooks),
            config: self.config,
            locks: EntityLocks::new(),
        })
    }
}

impl<E: Entity> Default for MachineBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
