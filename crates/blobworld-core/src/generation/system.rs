//! Star system generation - a star, its planets and their moons

use std::f64::consts::TAU;

use blobworld_logic::orbit::{Orbit, OrbitError};
use hecs::{Entity, World};
use rand::Rng;

use super::names::{moon_name, planet_name, star_name};
use super::surface::generate_surface;
use crate::components::{Body, BodyId, OrbitalMotion, Planet, WorldTransform};
use crate::config::WorldConfig;

/// Spacing factor between successive planet orbits
const ORBIT_SPACING: f64 = 1.6;

/// Result of generating a star system
#[derive(Debug, Clone, Default)]
pub struct SystemLayout {
    /// Every body, indexed by `BodyId`
    pub bodies: Vec<Entity>,
    /// Bodies that carry a surface
    pub planets: Vec<BodyId>,
}

/// Generate the star system into the ECS world. Parents always get lower ids
/// than their satellites.
pub fn generate_system(
    world: &mut World,
    config: &WorldConfig,
    rng: &mut impl Rng,
) -> Result<SystemLayout, OrbitError> {
    let mut layout = SystemLayout::default();

    let star = star_name(rng);
    let star_entity = world.spawn((
        Body::new(0, star.clone(), config.planet_radius * 5.0, config.star_mu),
        WorldTransform::default(),
    ));
    layout.bodies.push(star_entity);

    for index in 0..config.planet_count {
        let name = planet_name(&star, index);
        let radius = config.planet_radius * rng.gen_range(0.8..1.2);
        let orbit = Orbit::new(
            config.inner_orbit * ORBIT_SPACING.powi(index as i32),
            rng.gen_range(0.0..0.05),
            rng.gen_range(0.0..0.05),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        )?;

        let planet_id = layout.bodies.len() as BodyId;
        let surface = generate_surface(config.surface_resolution, radius, rng);
        let entity = world.spawn((
            Body::new(planet_id, name.clone(), radius, radius * radius * 6.0),
            OrbitalMotion {
                orbit,
                parent: 0,
            },
            WorldTransform::default(),
            Planet { surface },
        ));
        layout.bodies.push(entity);
        layout.planets.push(planet_id);

        if config.moons {
            let moon_id = layout.bodies.len() as BodyId;
            let moon_radius = radius * 0.25;
            let orbit = Orbit::new(
                radius * rng.gen_range(4.0..6.0),
                rng.gen_range(0.0..0.1),
                rng.gen_range(0.0..0.3),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
            )?;
            let moon = world.spawn((
                Body::new(moon_id, moon_name(&name), moon_radius, moon_radius * moon_radius),
                OrbitalMotion {
                    orbit,
                    parent: planet_id,
                },
                WorldTransform::default(),
            ));
            layout.bodies.push(moon);
        }
    }

    log::info!(
        "Generated {} with {} planets ({} bodies)",
        star,
        layout.planets.len(),
        layout.bodies.len()
    );
    Ok(layout)
}
