//! Persistence collaborator used by the machine to load and save entities.
//!
//! How records are stored is outside this crate. The machine only needs
//! `load` and `save`; [`MemoryRepository`] is enough for tests and for
//! services that keep their entities in process.

use crate::core::Entity;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors reported by a [`Repository`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    #[error("entity '{0}' not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Loads and saves entities by identity.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn load(&self, id: &E::Id) -> Result<E, PersistenceError>;

    async fn save(&self, entity: &E) -> Result<(), PersistenceError>;
}

/// In-memory repository keyed by entity id.
///
/// Every load hands out a clone, so callers never share a record with the
/// store.
pub struct MemoryRepository<E: Entity> {
    records: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a record directly, bypassing the machine.
    pub fn insert(&self, entity: E) {
        self.records.write().insert(entity.id().clone(), entity);
    }

    /// Current stored copy of a record.
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn load(&self, id: &E::Id) -> Result<E, PersistenceError> {
        self.get(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }

    async fn save(&self, entity: &E) -> Result<(), PersistenceError> {
        self.insert(entity.clone());
        Ok(())
    }
}
