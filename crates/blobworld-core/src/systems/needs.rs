//! Needs system - grows deficits, drains health, enqueues corrective goals

use std::collections::HashMap;

use blobworld_logic::needs::NeedRates;
use blobworld_logic::surface::Resource;
use hecs::{Entity, World};

use crate::components::{Blob, Goals, Health, NeedKind, Needs, Planet, Position};
use crate::config::BehaviorConfig;

/// Whether the blob's current tile has air to breathe.
pub fn tile_has_air(world: &World, bodies: &[Entity], position: &Position) -> bool {
    bodies
        .get(position.planet as usize)
        .and_then(|&entity| world.get::<&Planet>(entity).ok())
        .map(|planet| planet.surface.ubiquity(position.tile, Resource::Air) > 0.0)
        .unwrap_or(false)
}

/// Accumulate needs over `dt` seconds and push goals for critical ones.
pub fn needs_system(
    world: &mut World,
    bodies: &[Entity],
    rates: &NeedRates,
    config: &BehaviorConfig,
    dt: f32,
) {
    let air: HashMap<Entity, bool> = world
        .query::<(&Blob, &Position)>()
        .iter()
        .map(|(entity, (_, pos))| (entity, tile_has_air(world, bodies, pos)))
        .collect();

    for (entity, (needs, health, goals)) in
        world.query_mut::<(&mut Needs, &mut Health, &mut Goals)>()
    {
        let has_air = air.get(&entity).copied().unwrap_or(false);
        needs.accumulate(dt, rates, has_air);

        let maxed = needs.maxed_count();
        if maxed > 0 {
            health.damage(config.starvation_damage * maxed as f32 * dt);
        }

        for (kind, urgency) in needs.critical(config.critical_threshold) {
            goals.0.push(kind.corrective_goal(), urgency);
        }
    }
}

/// Find blobs with urgent needs (above threshold)
pub fn find_urgent_needs(world: &World, threshold: f32) -> Vec<(Entity, NeedKind)> {
    world
        .query::<(&Blob, &Needs)>()
        .iter()
        .filter_map(|(entity, (_, needs))| needs.most_urgent(threshold).map(|k| (entity, k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Body;
    use blobworld_logic::goals::GoalKind;
    use blobworld_logic::surface::{Surface, TileId, TileType};

    fn world_with_planet(fill: TileType) -> (World, Vec<Entity>) {
        let mut world = World::new();
        let planet = world.spawn((
            Body::new(0, "Test", 10.0, 1.0),
            Planet {
                surface: Surface::new(2, 10.0, fill),
            },
        ));
        (world, vec![planet])
    }

    #[test]
    fn test_hunger_enqueues_eat() {
        let (mut world, bodies) = world_with_planet(TileType::Sand);
        let blob = world.spawn((
            Blob,
            Position::new(0, TileId(0)),
            Needs {
                hunger: 0.55,
                ..Default::default()
            },
            Health::new(10.0),
            Goals::default(),
        ));

        needs_system(
            &mut world,
            &bodies,
            &NeedRates::default(),
            &BehaviorConfig::default(),
            1.0,
        );

        let goals = world.get::<&Goals>(blob).unwrap();
        assert_eq!(goals.0.active().unwrap().kind, GoalKind::Eat);
    }

    #[test]
    fn test_underwater_blob_loses_breath() {
        let (mut world, bodies) = world_with_planet(TileType::ShallowWater);
        let blob = world.spawn((
            Blob,
            Position::new(0, TileId(0)),
            Needs::default(),
            Health::new(10.0),
            Goals::default(),
        ));

        let config = BehaviorConfig::default();
        for _ in 0..12 {
            needs_system(&mut world, &bodies, &NeedRates::default(), &config, 1.0);
        }

        let needs = *world.get::<&Needs>(blob).unwrap();
        assert!(needs.breath > 0.5);
        let goals = world.get::<&Goals>(blob).unwrap();
        assert_eq!(
            goals.0.active().unwrap().kind,
            NeedKind::Breath.corrective_goal()
        );
    }

    #[test]
    fn test_maxed_need_drains_health() {
        let (mut world, bodies) = world_with_planet(TileType::Sand);
        let blob = world.spawn((
            Blob,
            Position::new(0, TileId(0)),
            Needs {
                hunger: 1.0,
                thirst: 1.0,
                breath: 0.0,
            },
            Health::new(10.0),
            Goals::default(),
        ));

        let config = BehaviorConfig::default();
        needs_system(&mut world, &bodies, &NeedRates::default(), &config, 1.0);

        let health = world.get::<&Health>(blob).unwrap();
        assert!((health.current - (10.0 - 2.0 * config.starvation_damage)).abs() < 1e-5);
        drop(health);

        assert_eq!(find_urgent_needs(&world, 0.9).len(), 1);
    }
}
