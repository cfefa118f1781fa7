//! Pure simulation logic for Blobworld.
//!
//! This crate contains the game logic that is independent of any ECS,
//! renderer, or runtime. Functions take plain data and return results, making
//! them unit-testable and reusable by the engine, the headless harness, and
//! any future front-end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`orbit`] | Classical orbital elements, Kepler solver, 4x4 transforms and closed-form inverses |
//! | [`surface`] | Cube-sphere planet surface: tile addressing, tile types, resource stock |
//! | [`search`] | Bounded-radius resource locating and tile paths |
//! | [`needs`] | Hunger / thirst / breath deficits and their corrective goals |
//! | [`goals`] | Urgency-ranked goal stack with interruption and subtask delegation |

pub mod goals;
pub mod needs;
pub mod orbit;
pub mod search;
pub mod surface;
