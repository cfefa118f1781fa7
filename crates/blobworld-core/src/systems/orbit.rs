//! Orbit system - moves bodies along their orbits and rebuilds world transforms

use std::collections::HashMap;

use glam::DMat4;
use hecs::{Entity, World};

use crate::components::{Body, BodyId, OrbitalMotion, WorldTransform};

/// Advance every orbit by `dt` seconds, then refresh world transforms.
pub fn orbit_system(world: &mut World, dt: f64) {
    let mus: HashMap<BodyId, f64> = world
        .query::<&Body>()
        .iter()
        .map(|(_, body)| (body.id, body.mu))
        .collect();

    for (_, motion) in world.query_mut::<&mut OrbitalMotion>() {
        let mu = mus.get(&motion.parent).copied().unwrap_or(0.0);
        motion.orbit.advance(dt, mu);
    }

    update_world_transforms(world);
}

/// Recompute `WorldTransform` for every body.
///
/// A body's orbit is expressed in its parent's inertial frame: the parent's
/// world position is applied, its orbital rotation is not. Parents always
/// carry lower ids than their satellites.
pub fn update_world_transforms(world: &mut World) {
    let mut bodies: Vec<(BodyId, Entity, Option<BodyId>, DMat4)> = world
        .query::<(&Body, Option<&OrbitalMotion>)>()
        .iter()
        .map(|(entity, (body, motion))| {
            (
                body.id,
                entity,
                motion.map(|m| m.parent),
                motion
                    .map(|m| m.orbit.transform())
                    .unwrap_or(DMat4::IDENTITY),
            )
        })
        .collect();
    bodies.sort_by_key(|(id, ..)| *id);

    let mut resolved: HashMap<BodyId, DMat4> = HashMap::with_capacity(bodies.len());
    for (id, entity, parent, local) in bodies {
        let parent_offset = parent
            .and_then(|p| resolved.get(&p))
            .map(|m| DMat4::from_translation(m.w_axis.truncate()))
            .unwrap_or(DMat4::IDENTITY);
        let transform = parent_offset * local;
        resolved.insert(id, transform);

        if let Ok(mut current) = world.get::<&mut WorldTransform>(entity) {
            current.0 = transform;
            continue;
        }
        let _ = world.insert_one(entity, WorldTransform(transform));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobworld_logic::orbit::Orbit;
    use glam::DVec3;

    #[test]
    fn test_moon_follows_planet() {
        let mut world = World::new();
        world.spawn((Body::new(0, "Sun", 10.0, 1000.0), WorldTransform::default()));
        let planet = world.spawn((
            Body::new(1, "Planet", 1.0, 10.0),
            OrbitalMotion {
                orbit: Orbit::circular(100.0).unwrap(),
                parent: 0,
            },
            WorldTransform::default(),
        ));
        let moon = world.spawn((
            Body::new(2, "Moon", 0.2, 0.1),
            OrbitalMotion {
                orbit: Orbit::new(5.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2).unwrap(),
                parent: 1,
            },
        ));

        update_world_transforms(&mut world);

        let p = world.get::<&WorldTransform>(planet).unwrap().position();
        let m = world.get::<&WorldTransform>(moon).unwrap().position();
        assert!(p.abs_diff_eq(DVec3::new(100.0, 0.0, 0.0), 1e-9));
        assert!(m.abs_diff_eq(DVec3::new(100.0, 5.0, 0.0), 1e-9));
    }

    #[test]
    fn test_orbit_system_advances() {
        let mut world = World::new();
        world.spawn((Body::new(0, "Sun", 10.0, 1.0),));
        let planet = world.spawn((
            Body::new(1, "Planet", 1.0, 0.0),
            OrbitalMotion {
                orbit: Orbit::circular(1.0).unwrap(),
                parent: 0,
            },
        ));

        // mu = 1, a = 1: one radian per second.
        orbit_system(&mut world, 0.5);
        let motion = world.get::<&OrbitalMotion>(planet).unwrap();
        assert!((motion.orbit.mean_anomaly - 0.5).abs() < 1e-12);
        drop(motion);
        assert!(world.get::<&WorldTransform>(planet).is_ok());
    }
}
