//! Modality: status machines whose hooks come from a persisted variant token
//!
//! Every entity carries two things: a status, owned by an [`EntityMachine`],
//! and a discriminator naming the strategy variant that decides what happens
//! around each status change. The discriminator is plain data. It is turned
//! into behavior only through a closed [`StrategyRegistry`] that lists every
//! variant explicitly, so an unknown token fails loudly instead of falling
//! back to a default.
//!
//! # Core Concepts
//!
//! - **Status**: the lifecycle of an entity class, via the `Status` trait
//! - **Transition table**: the static set of allowed status pairs
//! - **Strategy variant**: pre- and post-hooks bound to one entity
//! - **Resolver**: discriminator in, freshly constructed variant out
//! - **Audit**: one structured record per operation and per hook
//!
//! # Example
//!
//! ```rust
//! use modality::builder::{MachineBuilder, RegistryBuilder, TransitionTableBuilder};
//! use modality::core::{Discriminator, Entity};
//! use modality::persistence::MemoryRepository;
//! use modality::status_enum;
//! use modality::strategy::Strategy;
//! use std::sync::Arc;
//!
//! status_enum! {
//!     pub enum DocStatus {
//!         Draft,
//!         Published,
//!     }
//!     final: [Published]
//! }
//!
//! #[derive(Clone, Debug)]
//! struct Doc {
//!     id: u32,
//!     status: DocStatus,
//!     kind: Discriminator,
//! }
//!
//! impl Entity for Doc {
//!     type Id = u32;
//!     type Status = DocStatus;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!     fn status(&self) -> DocStatus { self.status }
//!     fn set_status(&mut self, status: DocStatus) { self.status = status; }
//!     fn discriminator(&self) -> &Discriminator { &self.kind }
//!     fn set_discriminator(&mut self, kind: Discriminator) { self.kind = kind; }
//! }
//!
//! struct Plain;
//! impl Strategy<Doc> for Plain {}
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let table = TransitionTableBuilder::new()
//!     .initial(DocStatus::Draft)
//!     .allow(DocStatus::Draft, DocStatus::Published)
//!     .build()
//!     .unwrap();
//! let registry = RegistryBuilder::new()
//!     .register("plain", |_: &Doc| Plain)
//!     .build()
//!     .unwrap();
//! let machine = MachineBuilder::new()
//!     .table(table)
//!     .registry(registry)
//!     .repository(Arc::new(MemoryRepository::<Doc>::new()))
//!     .build()
//!     .unwrap();
//!
//! machine
//!     .create(Doc { id: 1, status: DocStatus::Draft, kind: "plain".into() })
//!     .await
//!     .unwrap();
//! let report = machine.transition(&1, DocStatus::Published).await.unwrap();
//! assert!(report.is_clean());
//! # });
//! ```

pub mod audit;
pub mod builder;
pub mod config;
pub mod core;
pub mod fixtures;
pub mod listing;
pub mod machine;
pub mod persistence;
pub mod strategy;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use audit::{AuditRecord, AuditSink};
pub use builder::{BuildError, MachineBuilder, RegistryBuilder, TransitionTableBuilder};
pub use config::MachineConfig;
pub use core::{Discriminator, Entity, Status, TransitionTable};
pub use machine::{EntityMachine, ReassignError, TransitionError, TransitionReport};
pub use persistence::{MemoryRepository, PersistenceError, Repository};
pub use strategy::{HookRejection, Resolver, Strategy, StrategyRegistry};
