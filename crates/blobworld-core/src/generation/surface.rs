//! Surface generation - terrain from a sum of sine waves over the sphere

use std::f64::consts::{PI, TAU};

use blobworld_logic::surface::{Surface, TileType};
use glam::DVec3;
use rand::Rng;

const WAVES: usize = 6;

/// One sine wave travelling along `direction`.
#[derive(Debug, Clone, Copy)]
struct Wave {
    direction: DVec3,
    frequency: f64,
    phase: f64,
    amplitude: f64,
}

fn random_direction(rng: &mut impl Rng) -> DVec3 {
    loop {
        let v = DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len2 = v.length_squared();
        if len2 > 1e-6 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}

/// Normalised height in `-1.0..=1.0` at a unit direction.
fn height_at(waves: &[Wave], d: DVec3) -> f64 {
    let total: f64 = waves.iter().map(|w| w.amplitude).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let sum: f64 = waves
        .iter()
        .map(|w| w.amplitude * (w.frequency * PI * w.direction.dot(d) + w.phase).sin())
        .sum();
    (sum / total).clamp(-1.0, 1.0)
}

/// Generate a planet surface. Latitude (|z| of the tile direction) drives ice.
pub fn generate_surface(resolution: u32, radius: f64, rng: &mut impl Rng) -> Surface {
    let waves: Vec<Wave> = (0..WAVES)
        .map(|octave| Wave {
            direction: random_direction(rng),
            frequency: 1.2 * 1.7f64.powi(octave as i32),
            phase: rng.gen_range(0.0..TAU),
            amplitude: 0.6f64.powi(octave as i32),
        })
        .collect();

    Surface::from_fn(resolution, radius, |_, d| {
        TileType::classify(height_at(&waves, d), d.z.abs())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobworld_logic::surface::Resource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_surface() {
        let a = generate_surface(8, 30.0, &mut StdRng::seed_from_u64(42));
        let b = generate_surface(8, 30.0, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.len(), 6 * 64);
        assert!(a.iter().zip(b.iter()).all(|((_, x), (_, y))| x == y));
    }

    #[test]
    fn test_poles_are_frozen_or_wet() {
        let surface = generate_surface(10, 30.0, &mut StdRng::seed_from_u64(7));
        let pole = surface.tile_at_direction(DVec3::Z);
        let tile = surface.tile_type(pole).unwrap();
        assert!(matches!(
            tile,
            TileType::Ice | TileType::DeepWater | TileType::ShallowWater
        ));
    }

    #[test]
    fn test_has_somewhere_to_stand() {
        let surface = generate_surface(12, 30.0, &mut StdRng::seed_from_u64(1));
        assert!(surface
            .iter()
            .any(|(id, _)| surface.ubiquity(id, Resource::Air) > 0.0));
    }
}
