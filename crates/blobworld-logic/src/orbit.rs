//! Orbital mechanics: classical elements to transforms.
//!
//! An [`Orbit`] is described by the six classical elements. From them we get
//! the body's position relative to the focus and a 4x4 transform whose local
//! frame points radially outward (+X) with +Z along the orbit normal. The
//! inverse transform is built in closed form from the same rotations, so a
//! camera riding an orbit gets its view matrix without a general inversion.

use glam::{DMat3, DMat4, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use thiserror::Error;

/// Newton iteration cap for Kepler's equation.
const KEPLER_MAX_ITERATIONS: usize = 32;
/// Convergence tolerance for the eccentric anomaly (radians).
const KEPLER_TOLERANCE: f64 = 1e-12;

/// Invalid orbital elements.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrbitError {
    #[error("semi-major axis must be positive, got {0}")]
    NonPositiveSemiMajorAxis(f64),
    #[error("eccentricity must be in [0, 1) for a bound orbit, got {0}")]
    UnboundEccentricity(f64),
    #[error("orbital elements must be finite")]
    NonFinite,
}

/// Six classical orbital elements. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly: f64,
}

impl Orbit {
    /// Build an orbit, rejecting unbound or degenerate elements.
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        longitude_of_ascending_node: f64,
        argument_of_periapsis: f64,
        mean_anomaly: f64,
    ) -> Result<Self, OrbitError> {
        let elements = [
            semi_major_axis,
            eccentricity,
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
            mean_anomaly,
        ];
        if elements.iter().any(|v| !v.is_finite()) {
            return Err(OrbitError::NonFinite);
        }
        if semi_major_axis <= 0.0 {
            return Err(OrbitError::NonPositiveSemiMajorAxis(semi_major_axis));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::UnboundEccentricity(eccentricity));
        }
        Ok(Self {
            semi_major_axis,
            eccentricity,
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
            mean_anomaly: wrap_angle(mean_anomaly),
        })
    }

    /// Circular, equatorial orbit of the given radius starting at periapsis.
    pub fn circular(radius: f64) -> Result<Self, OrbitError> {
        Self::new(radius, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly.
    pub fn eccentric_anomaly(&self) -> f64 {
        let m = wrap_angle(self.mean_anomaly);
        let e = self.eccentricity;
        if e == 0.0 {
            return m;
        }

        let mut ecc = if e < 0.8 { m } else { PI };
        for _ in 0..KEPLER_MAX_ITERATIONS {
            let f = ecc - e * ecc.sin() - m;
            let f_prime = 1.0 - e * ecc.cos();
            let step = f / f_prime;
            ecc -= step;
            if step.abs() < KEPLER_TOLERANCE {
                break;
            }
        }
        ecc
    }

    /// Angle between periapsis and the body, seen from the focus.
    pub fn true_anomaly(&self) -> f64 {
        let ecc = self.eccentric_anomaly();
        let e = self.eccentricity;
        let y = (1.0 - e * e).sqrt() * ecc.sin();
        let x = ecc.cos() - e;
        y.atan2(x)
    }

    /// Distance from the focus.
    pub fn radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentric_anomaly().cos())
    }

    /// Position in the orbital plane (periapsis along +X).
    pub fn perifocal_position(&self) -> DVec3 {
        let r = self.radius();
        let v = self.true_anomaly();
        DVec3::new(r * v.cos(), r * v.sin(), 0.0)
    }

    /// Rotation from the perifocal frame into the reference frame.
    pub fn rotation(&self) -> DMat3 {
        DMat3::from_rotation_z(self.longitude_of_ascending_node)
            * DMat3::from_rotation_x(self.inclination)
            * DMat3::from_rotation_z(self.argument_of_periapsis)
    }

    /// Position relative to the focus in the reference frame.
    pub fn position(&self) -> DVec3 {
        self.rotation() * self.perifocal_position()
    }

    /// Local-to-parent transform: `Rz(Ω) Rx(i) Rz(ω + ν) T(r, 0, 0)`.
    pub fn transform(&self) -> DMat4 {
        let r = self.radius();
        let v = self.true_anomaly();
        DMat4::from_rotation_z(self.longitude_of_ascending_node)
            * DMat4::from_rotation_x(self.inclination)
            * DMat4::from_rotation_z(self.argument_of_periapsis + v)
            * DMat4::from_translation(DVec3::new(r, 0.0, 0.0))
    }

    /// Parent-to-local transform, the exact inverse of [`Orbit::transform`].
    pub fn inverse_transform(&self) -> DMat4 {
        let r = self.radius();
        let v = self.true_anomaly();
        DMat4::from_translation(DVec3::new(-r, 0.0, 0.0))
            * DMat4::from_rotation_z(-(self.argument_of_periapsis + v))
            * DMat4::from_rotation_x(-self.inclination)
            * DMat4::from_rotation_z(-self.longitude_of_ascending_node)
    }

    /// Orbital period around a focus with gravitational parameter `mu`.
    pub fn period(&self, mu: f64) -> f64 {
        TAU * (self.semi_major_axis.powi(3) / mu).sqrt()
    }

    /// Mean angular motion (radians per second).
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Move the body along its orbit by `dt` seconds.
    pub fn advance(&mut self, dt: f64, mu: f64) {
        if mu <= 0.0 {
            return;
        }
        self.mean_anomaly = wrap_angle(self.mean_anomaly + self.mean_motion(mu) * dt);
    }

    /// View matrix for an eye sitting on this orbit looking at the focus.
    pub fn look_at_center(&self, up: DVec3) -> DMat4 {
        let eye = self.position();
        let up = if eye.cross(up).length_squared() < 1e-12 {
            // Looking straight along `up`: fall back to the orbit normal.
            self.rotation() * DVec3::Z
        } else {
            up
        };
        DMat4::look_at_rh(eye, DVec3::ZERO, up)
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Orbit {
        Orbit::new(10.0, 0.3, 0.4, 1.1, 0.7, 2.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_elements() {
        assert_eq!(
            Orbit::new(-1.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            Err(OrbitError::NonPositiveSemiMajorAxis(-1.0))
        );
        assert_eq!(
            Orbit::new(1.0, 1.0, 0.0, 0.0, 0.0, 0.0),
            Err(OrbitError::UnboundEccentricity(1.0))
        );
        assert_eq!(
            Orbit::new(1.0, 0.1, f64::NAN, 0.0, 0.0, 0.0),
            Err(OrbitError::NonFinite)
        );
    }

    #[test]
    fn test_kepler_equation_holds() {
        let orbit = sample();
        let ecc = orbit.eccentric_anomaly();
        let m = ecc - orbit.eccentricity * ecc.sin();
        assert!((m - orbit.mean_anomaly).abs() < 1e-10);
    }

    #[test]
    fn test_high_eccentricity_converges() {
        let orbit = Orbit::new(1.0, 0.95, 0.0, 0.0, 0.0, 0.1).unwrap();
        let ecc = orbit.eccentric_anomaly();
        assert!((ecc - 0.95 * ecc.sin() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_circular_radius_constant() {
        let mut orbit = Orbit::circular(5.0).unwrap();
        for _ in 0..10 {
            orbit.advance(0.37, 1.0);
            assert!((orbit.radius() - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_inverse_is_identity() {
        let orbit = sample();
        let product = orbit.transform() * orbit.inverse_transform();
        assert!(product.abs_diff_eq(DMat4::IDENTITY, 1e-9));
        let product = orbit.inverse_transform() * orbit.transform();
        assert!(product.abs_diff_eq(DMat4::IDENTITY, 1e-9));
    }

    #[test]
    fn test_transform_translation_matches_position() {
        let orbit = sample();
        let origin = orbit.transform().transform_point3(DVec3::ZERO);
        assert!(origin.abs_diff_eq(orbit.position(), 1e-9));
    }

    #[test]
    fn test_periapsis_and_apoapsis_distances() {
        let mut orbit = Orbit::new(10.0, 0.5, 0.0, 0.0, 0.0, 0.0).unwrap();
        assert!((orbit.radius() - 5.0).abs() < 1e-9);
        orbit.mean_anomaly = PI;
        assert!((orbit.radius() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let mut orbit = sample();
        let start = orbit.position();
        let period = orbit.period(3.0);
        orbit.advance(period, 3.0);
        assert!(orbit.position().abs_diff_eq(start, 1e-6));
    }

    #[test]
    fn test_look_at_center_points_focus_forward() {
        let orbit = Orbit::new(8.0, 0.0, 0.3, 0.0, 0.0, 1.0).unwrap();
        let view = orbit.look_at_center(DVec3::Z);
        let focus_in_view = view.transform_point3(DVec3::ZERO);
        // Right-handed view space looks down -Z.
        assert!(focus_in_view.z < 0.0);
        assert!((focus_in_view.z + 8.0).abs() < 1e-9);
    }
}
