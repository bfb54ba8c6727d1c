//! Core lifecycle types.
//!
//! This module contains the pure data side of the machine:
//! - Status definitions via the `Status` trait
//! - The `Entity` contract and its persisted `Discriminator`
//! - The static `TransitionTable`
//!
//! Nothing in here performs I/O or runs strategy hooks.

mod entity;
mod state;
mod table;

pub use entity::{Discriminator, Entity};
pub use state::Status;
pub use table::TransitionTable;
