//! Blob generation

use std::f32::consts::TAU;

use blobworld_logic::surface::{Resource, TileId};
use hecs::{Entity, World};
use rand::Rng;

use super::names::generate_name;
use crate::components::*;

/// Starting health of every blob
pub const BLOB_HEALTH: f32 = 25.0;

/// Spawn `count` blobs on random tiles of `planet` that can be stood on and
/// breathed on. Ids are taken from `next_id`.
pub fn spawn_blobs(
    world: &mut World,
    bodies: &[Entity],
    planet: BodyId,
    count: u32,
    next_id: &mut u64,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let land: Vec<TileId> = bodies
        .get(planet as usize)
        .and_then(|&entity| world.get::<&Planet>(entity).ok())
        .map(|p| {
            p.surface
                .iter()
                .map(|(id, _)| id)
                .filter(|&id| p.surface.walkable(id) && p.surface.ubiquity(id, Resource::Air) > 0.0)
                .collect()
        })
        .unwrap_or_default();

    if land.is_empty() {
        log::warn!("Planet {} has no land; no blobs spawned", planet);
        return Vec::new();
    }

    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let tile = land[rng.gen_range(0..land.len())];
        let id = BlobId(*next_id);
        *next_id += 1;

        let needs = Needs {
            hunger: rng.gen_range(0.0..0.3),
            thirst: rng.gen_range(0.0..0.3),
            breath: 0.0,
        };

        let entity = world.spawn((
            Blob,
            id,
            generate_name(rng),
            Position::new(planet, tile),
            Heading(rng.gen_range(0.0..TAU)),
            needs,
            Health::new(BLOB_HEALTH),
            Traits::random(rng),
            Goals::default(),
            GoalTimer::default(),
        ));
        spawned.push(entity);
    }

    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobworld_logic::surface::{Surface, TileType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_on_land_only() {
        let mut world = World::new();
        let surface = Surface::from_fn(4, 10.0, |_, d| {
            if d.x > 0.5 {
                TileType::Grass
            } else {
                TileType::DeepWater
            }
        });
        let planet = world.spawn((Body::new(0, "Test", 10.0, 1.0), Planet { surface }));
        let mut next_id = 10;

        let blobs = spawn_blobs(
            &mut world,
            &[planet],
            0,
            20,
            &mut next_id,
            &mut StdRng::seed_from_u64(2),
        );

        assert_eq!(blobs.len(), 20);
        assert_eq!(next_id, 30);
        let surface = world.get::<&Planet>(planet).unwrap().surface.clone();
        for entity in blobs {
            let position = *world.get::<&Position>(entity).unwrap();
            assert_eq!(surface.tile_type(position.tile), Some(TileType::Grass));
        }
    }

    #[test]
    fn test_no_land_no_blobs() {
        let mut world = World::new();
        let surface = Surface::new(2, 10.0, TileType::ShallowWater);
        let planet = world.spawn((Planet { surface },));
        let mut next_id = 0;

        let blobs = spawn_blobs(
            &mut world,
            &[planet],
            0,
            5,
            &mut next_id,
            &mut StdRng::seed_from_u64(2),
        );
        assert!(blobs.is_empty());
        assert_eq!(next_id, 0);
    }
}
