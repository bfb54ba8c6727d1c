//! Static allow-list of status transitions.

use super::state::Status;

/// Explicit allow-list of `(from, to)` pairs plus the initial status.
///
/// Legality never depends on the entity's discriminator. Build one with
/// [`TransitionTableBuilder`](crate::builder::TransitionTableBuilder), which
/// rejects edges leaving a final status, so a final status never has
/// outgoing transitions.
#[derive(Clone, Debug)]
pub struct TransitionTable<S: Status> {
    pub(crate) initial: S,
    pub(crate) edges: Vec<(S, S)>,
}

impl<S: Status> TransitionTable<S> {
    /// Status every new entity starts in.
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Check whether `from -> to` is an allowed transition (pure).
    pub fn is_allowed(&self, from: S, to: S) -> bool {
        !from.is_final() && self.edges.iter().any(|&(f, t)| f == from && t == to)
    }

    /// Destinations reachable in one step from `from`, in declaration order.
    pub fn targets(&self, from: S) -> Vec<S> {
        if from.is_final() {
            return Vec::new();
        }
        self.edges
            .iter()
            .filter(|(f, _)| *f == from)
            .map(|&(_, t)| t)
            .collect()
    }

    pub fn edges(&self) -> &[(S, S)] {
        &self.edges
    }
}
