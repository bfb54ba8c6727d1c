//! Entities governed by a status machine and a persisted discriminator.

use super::state::Status;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Persisted token naming the strategy variant that governs an entity.
///
/// The token is opaque data. It is only ever turned into behavior through a
/// [`StrategyRegistry`](crate::strategy::StrategyRegistry) lookup.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Discriminator(String);

impl Discriminator {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token has a shape the registry accepts: non-empty,
    /// lowercase ASCII alphanumerics, `-` and `_`.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
    }
}

impl Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Discriminator {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Discriminator {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A record whose status is owned by an
/// [`EntityMachine`](crate::machine::EntityMachine).
///
/// The setters exist for the machine and for repositories rebuilding
/// records. Strategy hooks only ever see `&Self`, so they cannot move the
/// status themselves.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;
    type Status: Status;

    fn id(&self) -> &Self::Id;

    fn status(&self) -> Self::Status;

    fn set_status(&mut self, status: Self::Status);

    fn discriminator(&self) -> &Discriminator;

    fn set_discriminator(&mut self, discriminator: Discriminator);
}
