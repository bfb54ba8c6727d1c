//! Strategy variants and their resolution from persisted discriminators.
//!
//! A strategy variant is the behavior object that governs one kind of
//! entity. The machine never branches on the discriminator itself: it asks
//! the [`Resolver`] for a freshly constructed variant bound to the entity
//! and calls its hooks around the status change.
//!
//! # Hook contract
//!
//! - Pre-hooks (`before`) guard irreversible external effects. Rejecting
//!   aborts the transition with nothing changed.
//! - Post-hooks (`after`) run once the new status is persisted. A failure is
//!   reported but never undoes the transition.
//! - `on_detach` / `on_attach` run when an administrator reassigns the
//!   discriminator.
//!
//! Every hook defaults to a no-op, so a variant only implements what it
//! cares about.

mod registry;
mod resolver;

pub use registry::{StrategyConstructor, StrategyRegistry, UnknownVariant};
pub use resolver::Resolver;

use crate::core::Entity;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a hook declined to let the operation proceed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HookRejection {
    #[error("insufficient credit (available: {available})")]
    InsufficientCredit { available: u32 },

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error("hook timed out after {0:?}")]
    Timeout(Duration),

    #[error("external collaborator failed: {0}")]
    External(String),
}

impl HookRejection {
    /// Stable label used in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientCredit { .. } => "insufficient_credit",
            Self::PaymentDeclined(_) => "payment_declined",
            Self::Precondition(_) => "precondition",
            Self::Timeout(_) => "timeout",
            Self::External(_) => "external",
        }
    }

    /// The hook was cancelled, so whatever it started may or may not have
    /// happened.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Behavior variant bound to a single entity.
///
/// Implementations receive the entity when they are constructed (see
/// [`StrategyConstructor`]) and read whatever they need from it. The
/// destination status is passed to `before` and `after`; entity classes
/// with a fixed status set usually expose named hooks instead and adapt
/// them onto this trait, as [`ListingStrategy`](crate::listing::ListingStrategy)
/// does.
#[async_trait]
pub trait Strategy<E: Entity>: Send + Sync {
    /// Runs before the status changes to `to`.
    async fn before(&self, to: E::Status) -> Result<(), HookRejection> {
        let _ = to;
        Ok(())
    }

    /// Runs after the status change to `to` has been persisted.
    async fn after(&self, to: E::Status) -> Result<(), HookRejection> {
        let _ = to;
        Ok(())
    }

    /// Runs on the outgoing variant when the discriminator is reassigned.
    async fn on_detach(&self) -> Result<(), HookRejection> {
        Ok(())
    }

    /// Runs on the incoming variant when the discriminator is reassigned.
    async fn on_attach(&self) -> Result<(), HookRejection> {
        Ok(())
    }
}
