//! Builder for strategy registries.

use crate::builder::error::{BuildError, RegistryViolation};
use crate::core::{Discriminator, Entity};
use crate::strategy::{Strategy, StrategyConstructor, StrategyRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for a [`StrategyRegistry`].
///
/// Registration happens once, at startup. Every known variant is listed
/// here explicitly; `build` rejects malformed and duplicate tokens, all of
/// them in one pass.
pub struct RegistryBuilder<E: Entity> {
    entries: Vec<(Discriminator, StrategyConstructor<E>)>,
}

impl<E: Entity> RegistryBuilder<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register the constructor for `token`.
    ///
    /// The constructor is called once per resolution and receives the
    /// entity the variant will be bound to.
    pub fn register<S, F>(mut self, token: impl Into<Discriminator>, constructor: F) -> Self
    where
        S: Strategy<E> + 'static,
        F: Fn(&E) -> S + Send + Sync + 'static,
    {
        let constructor: StrategyConstructor<E> =
            Arc::new(move |entity: &E| Box::new(constructor(entity)) as Box<dyn Strategy<E>>);
        self.entries.push((token.into(), constructor));
        self
    }

    /// Build the registry.
    pub fn build(self) -> Result<StrategyRegistry<E>, BuildError> {
        if self.entries.is_empty() {
            return Err(BuildError::EmptyRegistry);
        }

        let mut checks: Vec<Validation<(), NonEmptyVec<RegistryViolation>>> = Vec::new();
        let mut constructors = HashMap::with_capacity(self.entries.len());

        for (token, constructor) in self.entries {
            if !token.is_well_formed() {
                checks.push(Validation::fail(RegistryViolation::MalformedToken(
                    token.to_string(),
                )));
            }
            if constructors.contains_key(&token) {
                checks.push(Validation::fail(RegistryViolation::DuplicateToken(
                    token.to_string(),
                )));
                continue;
            }
            constructors.insert(token, constructor);
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(StrategyRegistry { constructors }),
            Validation::Failure(violations) => Err(BuildError::InvalidRegistry(
                violations.iter().cloned().collect(),
            )),
        }
    }
}

impl<E: Entity> Default for RegistryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
