//! Lifecycle systems - death and surface regrowth

use hecs::World;

use crate::components::{Blob, BlobId, Health, Name, Planet};

/// Despawn blobs whose health ran out. Returns who died.
pub fn death_system(world: &mut World) -> Vec<(BlobId, String)> {
    let dead: Vec<(hecs::Entity, BlobId, String)> = world
        .query::<(&Blob, &BlobId, &Health, Option<&Name>)>()
        .iter()
        .filter(|(_, (_, _, health, _))| health.is_dead())
        .map(|(entity, (_, id, _, name))| {
            let name = name
                .map(|n| n.0.clone())
                .unwrap_or_else(|| format!("blob #{}", id.0));
            (entity, *id, name)
        })
        .collect();

    let mut died = Vec::with_capacity(dead.len());
    for (entity, id, name) in dead {
        if world.despawn(entity).is_ok() {
            log::info!("{} has died", name);
            died.push((id, name));
        }
    }
    died
}

/// Regrow food and water on every planet.
pub fn regrowth_system(world: &mut World, dt: f32, rate: f32) {
    for (_, planet) in world.query_mut::<&mut Planet>() {
        planet.surface.regrow(dt, rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobworld_logic::surface::{Resource, Surface, TileId, TileType};

    #[test]
    fn test_dead_blobs_are_despawned() {
        let mut world = World::new();
        let alive = world.spawn((Blob, BlobId(1), Health::new(10.0), Name::new("Pip")));
        let mut health = Health::new(10.0);
        health.damage(20.0);
        world.spawn((Blob, BlobId(2), health, Name::new("Ruff")));

        let died = death_system(&mut world);
        assert_eq!(died, vec![(BlobId(2), "Ruff".to_string())]);
        assert!(world.contains(alive));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_regrowth() {
        let mut world = World::new();
        let mut surface = Surface::new(2, 10.0, TileType::Forest);
        surface.consume(TileId(0), Resource::Food, 0.5);
        let planet = world.spawn((Planet { surface },));

        regrowth_system(&mut world, 10.0, 0.01);
        let planet = world.get::<&Planet>(planet).unwrap();
        assert!((planet.surface.ubiquity(TileId(0), Resource::Food) - 0.6).abs() < 1e-5);
    }
}
