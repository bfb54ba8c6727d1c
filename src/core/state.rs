//! Core Status trait for entity lifecycles.
//!
//! An entity class owns exactly one enumerated status set. Statuses are
//! plain values; everything about them is answered by pure methods.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for the enumerated statuses an entity moves through.
///
/// All methods are pure. Implement it by hand or generate it with
/// [`status_enum!`](crate::status_enum).
///
/// # Required Traits
///
/// - `Copy` + `Eq` + `Hash`: statuses are small tags compared and stored in tables
/// - `Debug`: statuses show up in errors and audit records
/// - `Serialize` + `DeserializeOwned`: statuses are persisted with the entity
///
/// # Example
///
/// ```rust
/// use modality::core::Status;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum TicketStatus {
///     Draft,
///     Open,
///     Closed,
/// }
///
/// impl Status for TicketStatus {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Draft => "Draft",
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Closed)
///     }
/// }
///
/// assert!(TicketStatus::Closed.is_final());
/// assert_eq!(TicketStatus::Open.name(), "Open");
/// ```
pub trait Status:
    Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Name used in logs, audit records and error messages.
    fn name(&self) -> &'static str;

    /// Whether this status is terminal.
    ///
    /// Terminal statuses reject every further transition, whatever the
    /// transition table says. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
