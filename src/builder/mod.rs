//! Builder API for tables, registries and machines.
//!
//! This module provides fluent builders and macros for assembling an
//! [`EntityMachine`](crate::machine::EntityMachine) with minimal
//! boilerplate. Builders validate what they are given and report
//! problems as [`BuildError`]s instead of panicking.

pub mod error;
pub mod machine;
pub mod macros;
pub mod registry;
pub mod table;

pub use error::{BuildError, RegistryViolation, TableViolation};
pub use machine::MachineBuilder;
pub use registry::RegistryBuilder;
pub use table::TransitionTableBuilder;
