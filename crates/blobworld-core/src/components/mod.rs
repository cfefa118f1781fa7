//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod blobs;
mod bodies;

pub use blobs::*;
pub use bodies::*;
