//! Turns an entity's stored discriminator into a live strategy variant.

use super::registry::{StrategyRegistry, UnknownVariant};
use super::Strategy;
use crate::core::{Discriminator, Entity};
use std::sync::Arc;

/// Resolves entities to freshly constructed, entity-bound variants.
///
/// Resolution is a pure function of the entity: nothing is cached, so a
/// reassigned discriminator takes effect on the very next call.
pub struct Resolver<E: Entity> {
    registry: Arc<StrategyRegistry<E>>,
}

impl<E: Entity> Resolver<E> {
    pub fn new(registry: Arc<StrategyRegistry<E>>) -> Self {
        Self { registry }
    }

    /// Resolve the variant named by `entity.discriminator()`.
    pub fn resolve(&self, entity: &E) -> Result<Box<dyn Strategy<E>>, UnknownVariant> {
        self.resolve_as(entity, entity.discriminator())
    }

    /// Resolve the variant named by `token`, bound to `entity`.
    ///
    /// Used when the entity does not carry `token` yet, e.g. while a
    /// reassignment is being validated.
    pub fn resolve_as(
        &self,
        entity: &E,
        token: &Discriminator,
    ) -> Result<Box<dyn Strategy<E>>, UnknownVariant> {
        let constructor = self.registry.lookup(token)?;
        Ok(constructor(entity))
    }

    pub fn registry(&self) -> &StrategyRegistry<E> {
        &self.registry
    }
}

impl<E: Entity> Clone for Resolver<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}
