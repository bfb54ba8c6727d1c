//! Closed mapping from discriminator tokens to strategy constructors.

use super::Strategy;
use crate::core::{Discriminator, Entity};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Factory producing a fresh variant bound to the given entity.
pub type StrategyConstructor<E> = Arc<dyn Fn(&E) -> Box<dyn Strategy<E>> + Send + Sync>;

/// The discriminator names no registered variant.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("no strategy registered for discriminator '{0}'")]
pub struct UnknownVariant(pub Discriminator);

/// Immutable table of every variant an entity class knows about.
///
/// Built once at startup through
/// [`RegistryBuilder`](crate::builder::RegistryBuilder) and shared behind an
/// `Arc`. It is never mutated afterwards, so concurrent reads need no
/// synchronization. Tokens outside the table are rejected; nothing is ever
/// instantiated from the token text itself.
pub struct StrategyRegistry<E: Entity> {
    pub(crate) constructors: HashMap<Discriminator, StrategyConstructor<E>>,
}

impl<E: Entity> StrategyRegistry<E> {
    /// Look up the constructor registered for `token`.
    pub fn lookup(&self, token: &Discriminator) -> Result<&StrategyConstructor<E>, UnknownVariant> {
        self.constructors
            .get(token)
            .ok_or_else(|| UnknownVariant(token.clone()))
    }

    pub fn contains(&self, token: &Discriminator) -> bool {
        self.constructors.contains_key(token)
    }

    /// Registered tokens, sorted.
    pub fn tokens(&self) -> Vec<&Discriminator> {
        let mut tokens: Vec<_> = self.constructors.keys().collect();
        tokens.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        tokens
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl<E: Entity> fmt::Debug for StrategyRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("tokens", &self.tokens())
            .finish()
    }
}
