//! Celestial bodies: the star, planets and moons.

use blobworld_logic::orbit::Orbit;
use blobworld_logic::surface::Surface;
use glam::{DMat4, DVec3};
use serde::{Deserialize, Serialize};

/// Stable body index, also the index into the engine's body table.
pub type BodyId = u32;

/// A celestial body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub radius: f64,
    /// Gravitational parameter (G * mass)
    pub mu: f64,
}

impl Body {
    pub fn new(id: BodyId, name: impl Into<String>, radius: f64, mu: f64) -> Self {
        Self {
            id,
            name: name.into(),
            radius,
            mu,
        }
    }
}

/// Orbit around another body. Bodies without it sit at the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrbitalMotion {
    pub orbit: Orbit,
    pub parent: BodyId,
}

/// Body-to-world transform, recomputed every tick from the orbit chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform(pub DMat4);

impl Default for WorldTransform {
    fn default() -> Self {
        Self(DMat4::IDENTITY)
    }
}

impl WorldTransform {
    pub fn position(&self) -> DVec3 {
        self.0.transform_point3(DVec3::ZERO)
    }
}

/// A body blobs can live on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub surface: Surface,
}

/// Camera riding an orbit around a body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraRig {
    pub target: BodyId,
    pub orbit: Orbit,
    /// Radians per second along the camera orbit
    pub speed: f64,
    pub up: DVec3,
}

impl CameraRig {
    pub fn new(target: BodyId, orbit: Orbit, speed: f64) -> Self {
        Self {
            target,
            orbit,
            speed,
            up: DVec3::Z,
        }
    }

    /// Re-aim the rig so it hovers above `direction` (planet-local) with the
    /// camera orbit's radius unchanged.
    pub fn hover_over(&mut self, direction: DVec3) {
        let d = direction.normalize_or_zero();
        if d == DVec3::ZERO {
            return;
        }
        // Rx(i) Rz(ω) x̂ = (cos ω, sin ω cos i, sin ω sin i)
        let sin_w = (d.y * d.y + d.z * d.z).sqrt();
        self.orbit.longitude_of_ascending_node = 0.0;
        self.orbit.argument_of_periapsis = sin_w.atan2(d.x);
        self.orbit.inclination = if sin_w > 1e-12 { d.z.atan2(d.y) } else { 0.0 };
        self.orbit.eccentricity = 0.0;
        self.orbit.mean_anomaly = 0.0;
    }
}

/// Eye, focus and view matrix handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub eye: DVec3,
    pub focus: DVec3,
    pub view: DMat4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_over_points_at_direction() {
        let mut rig = CameraRig::new(0, Orbit::circular(10.0).unwrap(), 0.0);
        for dir in [
            DVec3::new(0.3, -0.5, 0.8),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, -1.0),
        ] {
            rig.hover_over(dir);
            let eye = rig.orbit.position();
            assert!((eye.length() - 10.0).abs() < 1e-9);
            assert!(eye.normalize().abs_diff_eq(dir.normalize(), 1e-9));
        }
    }

    #[test]
    fn test_world_transform_position() {
        let t = WorldTransform(DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(t.position(), DVec3::new(1.0, 2.0, 3.0));
    }
}
