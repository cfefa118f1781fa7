//! Blobworld Core - planetary blob simulation engine
//!
//! An ECS-based simulation of a small star system whose planets are covered
//! in cube-sphere tiles and populated by blobs. Each blob has needs (hunger,
//! thirst, breath) that push goals onto its goal stack; the goal system runs
//! the most urgent one.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: the star, planets, moons and blobs
//! - **Components**: Pure data attached to entities (Position, Needs, Goals, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Pure algorithms (orbits, tiles, search, goal scheduling) live in
//! `blobworld-logic` and are re-used here.
//!
//! # Example
//!
//! ```rust,no_run
//! use blobworld_core::prelude::*;
//!
//! let mut engine = SimulationEngine::new(WorldConfig::default());
//! engine.generate(42).expect("valid orbits");
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod inspect;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{BehaviorConfig, ConfigError, WorldConfig};
    pub use crate::engine::SimulationEngine;
    pub use crate::inspect::{BlobReport, BodyReport, WorldReport};
    pub use crate::persistence::SaveError;
}
