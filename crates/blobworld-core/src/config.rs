//! World configuration.
//!
//! Every tunable lives in [`WorldConfig`]. All fields have defaults, so a
//! JSON file only needs to name what it changes.

use std::path::Path;

use blobworld_logic::needs::NeedRates;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Behaviour tunables shared by every blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Needs above this enqueue their corrective goal
    pub critical_threshold: f32,
    /// Eat / drink stop once the need drops below this
    pub sated_threshold: f32,
    /// Seconds of idling before the blob looks around or strolls
    pub idle_time: f32,
    /// Seconds a look-around lasts
    pub look_time: f32,
    /// Heading change while looking around (radians / second)
    pub look_turn_rate: f32,
    /// Urgency of self-started goals (stroll, look around)
    pub wander_urgency: f32,
    /// Base urgency of an attack, scaled by aggression
    pub attack_urgency: f32,
    /// Stroll destinations are at most this many tiles away
    pub stroll_radius: u32,
    /// Resource searches scan this many tiles
    pub search_radius: u32,
    /// Stock consumed per second while eating
    pub eat_rate: f32,
    /// Stock consumed per second while drinking
    pub drink_rate: f32,
    /// Health lost per second for each maxed-out need
    pub starvation_damage: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 0.5,
            sated_threshold: 0.1,
            idle_time: 3.0,
            look_time: 2.0,
            look_turn_rate: 1.5,
            wander_urgency: 0.1,
            attack_urgency: 0.6,
            stroll_radius: 4,
            search_radius: 12,
            eat_rate: 0.25,
            drink_rate: 0.4,
            starvation_damage: 2.0,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u64,
    pub planet_count: u32,
    /// Give each planet a small moon
    pub moons: bool,
    /// Tiles per cube-face edge
    pub surface_resolution: u32,
    pub planet_radius: f64,
    /// Semi-major axis of the innermost planet
    pub inner_orbit: f64,
    pub star_mu: f64,
    pub blobs_per_planet: u32,
    /// Simulation sub-step (seconds)
    pub fixed_step: f32,
    /// Seconds between needs updates
    pub needs_interval: f32,
    /// Seconds between surface regrowth passes
    pub regrowth_interval: f32,
    /// Stock regained per second
    pub regrowth_rate: f32,
    pub need_rates: NeedRates,
    pub behavior: BehaviorConfig,
    /// Camera orbit radius in planet radii
    pub camera_distance: f64,
    /// Camera orbit speed (radians / second)
    pub camera_speed: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            planet_count: 3,
            moons: true,
            surface_resolution: 12,
            planet_radius: 40.0,
            inner_orbit: 1_000.0,
            star_mu: 5.0e6,
            blobs_per_planet: 12,
            fixed_step: 0.1,
            needs_interval: 0.5,
            regrowth_interval: 10.0,
            regrowth_rate: 0.005,
            need_rates: NeedRates::default(),
            behavior: BehaviorConfig::default(),
            camera_distance: 3.0,
            camera_speed: 0.05,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.surface_resolution == 0 {
            return invalid("surface_resolution must be at least 1");
        }
        if !self.fixed_step.is_finite() || self.fixed_step <= 0.0 {
            return invalid("fixed_step must be positive");
        }
        if self.planet_radius <= 0.0 || self.inner_orbit <= 0.0 || self.star_mu <= 0.0 {
            return invalid("planet_radius, inner_orbit and star_mu must be positive");
        }
        if self.camera_distance <= 1.0 {
            return invalid("camera_distance must keep the camera outside the planet");
        }
        let b = &self.behavior;
        if !(0.0..=1.0).contains(&b.critical_threshold) || !(0.0..=1.0).contains(&b.sated_threshold)
        {
            return invalid("need thresholds must be within 0..=1");
        }
        if b.sated_threshold >= b.critical_threshold {
            return invalid("sated_threshold must be below critical_threshold");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            WorldConfig::from_json_str(r#"{ "seed": 9, "behavior": { "idle_time": 1.0 } }"#)
                .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.behavior.idle_time, 1.0);
        assert_eq!(config.planet_count, WorldConfig::default().planet_count);
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let err = WorldConfig::from_json_str(
            r#"{ "behavior": { "critical_threshold": 0.2, "sated_threshold": 0.4 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            WorldConfig::from_json_str("{ seed: }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = WorldConfig::default();
        let back = WorldConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(back.surface_resolution, config.surface_resolution);
    }
}
