//! Build errors for transition tables, registries and machines.

use crate::config::ConfigError;
use thiserror::Error;

/// Problems found in a transition table definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TableViolation {
    #[error("'{from}' is final and cannot transition to '{to}'")]
    EdgeFromFinal { from: String, to: String },

    #[error("'{0}' transitions to itself")]
    SelfLoop(String),

    #[error("transition '{from}' -> '{to}' declared more than once")]
    DuplicateEdge { from: String, to: String },
}

/// Problems found in a strategy registry definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryViolation {
    #[error("discriminator '{0}' is registered more than once")]
    DuplicateToken(String),

    #[error("discriminator '{0}' is malformed (expected lowercase ASCII, digits, '-' or '_')")]
    MalformedToken(String),
}

/// Errors that can occur when building tables, registries and machines.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial status not specified. Call .initial(status) before .build()")]
    MissingInitialStatus,

    #[error("No transitions defined. Add at least one with .allow(from, to)")]
    NoTransitions,

    #[error("No strategies registered. Add at least one with .register(token, constructor)")]
    EmptyRegistry,

    #[error("Invalid transition table: {}", join(.0))]
    InvalidTable(Vec<TableViolation>),

    #[error("Invalid strategy registry: {}", join(.0))]
    InvalidRegistry(Vec<RegistryViolation>),

    #[error("Transition table not specified. Call .table(table)")]
    MissingTable,

    #[error("Strategy registry not specified. Call .registry(registry)")]
    MissingRegistry,

    #[error("Repository not specified. Call .repository(repository)")]
    MissingRepository,

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
