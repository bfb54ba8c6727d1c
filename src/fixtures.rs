//! Named, composable fixture states.
//!
//! A [`Fixture`] is a base value plus a set of named overlays. Callers pick
//! overlays by name and they are applied in the order given, each one
//! receiving the output of the previous one:
//!
//! ```rust
//! use modality::fixtures::Fixture;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Account { balance: u32, frozen: bool }
//!
//! let fixture = Fixture::new(Account { balance: 0, frozen: false })
//!     .overlay("funded", |a| Account { balance: 10, ..a })
//!     .overlay("frozen", |a| Account { frozen: true, ..a });
//!
//! let account = fixture.build(&["funded", "frozen"]).unwrap();
//! assert_eq!(account, Account { balance: 10, frozen: true });
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FixtureError {
    #[error("unknown fixture overlay '{name}' (known: {known})")]
    UnknownOverlay { name: String, known: String },
}

type Overlay<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Base value plus named overlays.
pub struct Fixture<T: Clone> {
    base: T,
    overlays: BTreeMap<String, Overlay<T>>,
}

impl<T: Clone> Fixture<T> {
    pub fn new(base: T) -> Self {
        Self {
            base,
            overlays: BTreeMap::new(),
        }
    }

    /// Register an overlay. A later overlay with the same name replaces the
    /// earlier one.
    pub fn overlay<F>(mut self, name: impl Into<String>, overlay: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.overlays.insert(name.into(), Arc::new(overlay));
        self
    }

    /// The base value with no overlays applied.
    pub fn base(&self) -> T {
        self.base.clone()
    }

    /// Apply the named overlays in order.
    ///
    /// Every name is checked before anything is applied.
    pub fn build(&self, names: &[&str]) -> Result<T, FixtureError> {
        let overlays = names
            .iter()
            .map(|name| {
                self.overlays
                    .get(*name)
                    .ok_or_else(|| FixtureError::UnknownOverlay {
                        name: (*name).to_string(),
                        known: self.names().join(", "),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(overlays
            .into_iter()
            .fold(self.base.clone(), |value, overlay| overlay(value)))
    }

    /// Registered overlay names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.overlays.keys().map(String::as_str).collect()
    }
}
