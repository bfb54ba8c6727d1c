//! Errors returned by machine operations.

use crate::persistence::PersistenceError;
use crate::strategy::{HookRejection, UnknownVariant};
use thiserror::Error;

/// Why a transition did not happen.
///
/// Every variant means the persisted status is unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("entity '{entity_id}' could not be loaded: {source}")]
    LoadFailed {
        entity_id: String,
        source: PersistenceError,
    },

    #[error("transition from '{from}' to '{to}' is not allowed")]
    IllegalTransition { from: String, to: String },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("pre-hook rejected the transition: {0}")]
    HookRejected(HookRejection),

    /// The pre-hook already ran; its side effects are orphaned.
    #[error("status '{to}' could not be persisted: {source}")]
    PersistenceFailed {
        to: String,
        source: PersistenceError,
    },
}

impl TransitionError {
    /// Stable label used in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } => "load_failed",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::UnknownVariant(_) => "unknown_variant",
            Self::HookRejected(_) => "hook_rejected",
            Self::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

/// A post-hook failed after the new status was committed.
///
/// Not an error of the transition: the status change stands and any
/// compensation is up to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("post-hook for '{to}' failed: {reason}")]
pub struct PostHookFailed {
    pub to: String,
    pub reason: HookRejection,
}

/// Why a discriminator reassignment did not happen.
///
/// Every variant means the persisted discriminator is unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReassignError {
    #[error("entity '{entity_id}' could not be loaded: {source}")]
    LoadFailed {
        entity_id: String,
        source: PersistenceError,
    },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("outgoing variant refused to detach: {0}")]
    DetachRejected(HookRejection),

    #[error("incoming variant refused to attach: {0}")]
    AttachRejected(HookRejection),

    #[error("discriminator '{token}' could not be persisted: {source}")]
    PersistenceFailed {
        token: String,
        source: PersistenceError,
    },
}

impl ReassignError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } => "load_failed",
            Self::UnknownVariant(_) => "unknown_variant",
            Self::DetachRejected(_) => "detach_rejected",
            Self::AttachRejected(_) => "attach_rejected",
            Self::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

/// Why a new entity was not stored.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CreateError {
    #[error("new entities must start in '{expected}', got '{actual}'")]
    NotInitialStatus { expected: String, actual: String },

    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariant),

    #[error("entity '{0}' already exists")]
    AlreadyExists(String),

    #[error("entity could not be persisted: {0}")]
    PersistenceFailed(PersistenceError),
}

impl CreateError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotInitialStatus { .. } => "not_initial_status",
            Self::UnknownVariant(_) => "unknown_variant",
            Self::AlreadyExists(_) => "already_exists",
            Self::PersistenceFailed(_) => "persistence_failed",
        }
    }
}
