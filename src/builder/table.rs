//! Builder for transition tables.

use crate::builder::error::{BuildError, TableViolation};
use crate::core::{Status, TransitionTable};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for a [`TransitionTable`] with a fluent API.
///
/// `build` reports every malformed edge at once rather than stopping at
/// the first one.
pub struct TransitionTableBuilder<S: Status> {
    initial: Option<S>,
    edges: Vec<(S, S)>,
}

impl<S: Status> TransitionTableBuilder<S> {
    pub fn new() -> Self {
        Self {
            initial: None,
            edges: Vec::new(),
        }
    }

    /// Set the initial status (required).
    pub fn initial(mut self, status: S) -> Self {
        self.initial = Some(status);
        self
    }

    /// Allow `from -> to`.
    pub fn allow(mut self, from: S, to: S) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Allow `from -> to` for every `to` in `targets`.
    pub fn allow_many(mut self, from: S, targets: &[S]) -> Self {
        self.edges.extend(targets.iter().map(|&to| (from, to)));
        self
    }

    /// Build the table.
    pub fn build(self) -> Result<TransitionTable<S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialStatus)?;

        if self.edges.is_empty() {
            return Err(BuildError::NoTransitions);
        }

        let mut checks: Vec<Validation<(), NonEmptyVec<TableViolation>>> = Vec::new();
        for (index, &(from, to)) in self.edges.iter().enumerate() {
            if from.is_final() {
                checks.push(Validation::fail(TableViolation::EdgeFromFinal {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                }));
            }
            if from == to {
                checks.push(Validation::fail(TableViolation::SelfLoop(
                    from.name().to_string(),
                )));
            }
            if self.edges[..index].contains(&(from, to)) {
                checks.push(Validation::fail(TableViolation::DuplicateEdge {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                }));
            }
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(TransitionTable {
                initial,
                edges: self.edges,
            }),
            Validation::Failure(violations) => Err(BuildError::InvalidTable(
                violations.iter().cloned().collect(),
            )),
        }
    }
}

impl<S: Status> Default for TransitionTableBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
