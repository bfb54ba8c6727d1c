//! Results of successful machine operations.

use super::error::PostHookFailed;
use crate::core::{Discriminator, Status};

/// A committed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionReport<S: Status> {
    pub entity_id: String,
    pub from: S,
    pub to: S,
    pub discriminator: Discriminator,
    /// Outcome of the post-hook. An `Err` here does not undo the transition.
    pub post_hook: Result<(), PostHookFailed>,
}

impl<S: Status> TransitionReport<S> {
    /// True when the post-hook completed as well.
    pub fn is_clean(&self) -> bool {
        self.post_hook.is_ok()
    }

    pub fn warning(&self) -> Option<&PostHookFailed> {
        self.post_hook.as_ref().err()
    }
}

/// A committed (or no-op) discriminator reassignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReassignReport {
    pub entity_id: String,
    pub from: Discriminator,
    pub to: Discriminator,
    /// False when the entity already carried the requested token.
    pub changed: bool,
    /// True when the old token was no longer registered, so no detach hook ran.
    pub detach_skipped: bool,
}
