//! Blob components: identity, location, body state and behaviour.

use std::collections::VecDeque;

use blobworld_logic::goals::{GoalId, GoalStack};
use blobworld_logic::surface::TileId;
use serde::{Deserialize, Serialize};

use super::BodyId;

pub use blobworld_logic::needs::{NeedKind, Needs};

/// Marker component identifying an entity as a blob
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Blob;

/// Stable blob identifier; survives save/load, unlike `hecs::Entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlobId(pub u64);

/// Name component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a blob stands: a tile on a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub planet: BodyId,
    pub tile: TileId,
}

impl Position {
    pub fn new(planet: BodyId, tile: TileId) -> Self {
        Self { planet, tile }
    }
}

/// Facing angle around the local surface normal (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Heading(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Per-blob temperament and physique.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    /// Tiles per second
    pub speed: f32,
    /// How far the blob notices others, in tiles
    pub perception: u32,
    /// 0.0 (placid) to 1.0 (picks a fight with anyone)
    pub aggression: f32,
    /// Damage per second dealt in an attack
    pub strength: f32,
}

impl Default for Traits {
    fn default() -> Self {
        Self {
            speed: 1.0,
            perception: 4,
            aggression: 0.0,
            strength: 5.0,
        }
    }
}

impl Traits {
    /// Generate random traits
    pub fn random(rng: &mut impl rand::Rng) -> Self {
        Self {
            speed: rng.gen_range(0.6..1.6),
            perception: rng.gen_range(2..=6),
            aggression: rng.gen_range(0.0f32..1.0).powi(2),
            strength: rng.gen_range(3.0..9.0),
        }
    }
}

/// The blob's goal stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Goals(pub GoalStack);

/// Time spent in the currently active goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalTimer {
    pub goal: Option<GoalId>,
    pub elapsed: f32,
}

/// Movement component - present only while the blob is walking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Tiles still to enter, in order
    pub path: VecDeque<TileId>,
    /// Fraction of the way to the next tile
    pub progress: f32,
}

impl Movement {
    pub fn new(path: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            path: path.into_iter().collect(),
            progress: 0.0,
        }
    }

    pub fn destination(&self) -> Option<TileId> {
        self.path.back().copied()
    }

    pub fn is_finished(&self) -> bool {
        self.path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_clamps() {
        let mut health = Health::new(10.0);
        health.damage(4.0);
        assert_eq!(health.current, 6.0);
        health.damage(-3.0);
        assert_eq!(health.current, 6.0);
        health.damage(100.0);
        assert!(health.is_dead());
        assert_eq!(health.fraction(), 0.0);
    }

    #[test]
    fn test_movement_destination() {
        let movement = Movement::new([TileId(3), TileId(4)]);
        assert_eq!(movement.destination(), Some(TileId(4)));
        assert!(!movement.is_finished());
        assert!(Movement::default().is_finished());
    }
}
