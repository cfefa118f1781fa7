//! Simulation engine - main entry point for running the simulation

use blobworld_logic::orbit::{Orbit, OrbitError};
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::*;
use crate::config::WorldConfig;
use crate::generation::{generate_system, spawn_blobs};
use crate::inspect::{self, BlobReport, WorldReport};
use crate::persistence::{self, SaveError, SimulationState};
use crate::systems::*;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all entities
    pub world: World,
    config: WorldConfig,
    /// Simulated seconds since generation
    sim_time: f64,
    /// Body entities indexed by `BodyId`
    bodies: Vec<Entity>,
    camera: CameraRig,
    rng: StdRng,
    next_blob_id: u64,
    deaths: u64,

    // Update timing
    accumulator: f32,
    last_needs_update: f64,
    last_regrowth_update: f64,

    time_scale: f32,
}

fn camera_orbit(radius: f64) -> Orbit {
    Orbit::circular(radius).unwrap_or(Orbit {
        semi_major_axis: 1.0,
        eccentricity: 0.0,
        inclination: 0.0,
        longitude_of_ascending_node: 0.0,
        argument_of_periapsis: 0.0,
        mean_anomaly: 0.0,
    })
}

impl SimulationEngine {
    /// Create a new empty simulation
    pub fn new(config: WorldConfig) -> Self {
        let camera = CameraRig::new(
            0,
            camera_orbit(config.planet_radius * config.camera_distance),
            config.camera_speed,
        );
        Self {
            world: World::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            sim_time: 0.0,
            bodies: Vec::new(),
            camera,
            next_blob_id: 0,
            deaths: 0,
            accumulator: 0.0,
            last_needs_update: 0.0,
            last_regrowth_update: 0.0,
            time_scale: 1.0,
        }
    }

    /// Generate a star system and populate its planets. Replaces any
    /// existing world.
    pub fn generate(&mut self, seed: u64) -> Result<(), OrbitError> {
        self.config.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
        self.world = World::new();
        self.sim_time = 0.0;
        self.next_blob_id = 0;
        self.deaths = 0;
        self.accumulator = 0.0;
        self.last_needs_update = 0.0;
        self.last_regrowth_update = 0.0;

        let layout = generate_system(&mut self.world, &self.config, &mut self.rng)?;
        self.bodies = layout.bodies;

        for &planet in &layout.planets {
            let spawned = spawn_blobs(
                &mut self.world,
                &self.bodies,
                planet,
                self.config.blobs_per_planet,
                &mut self.next_blob_id,
                &mut self.rng,
            );
            log::info!("Spawned {} blobs on body {}", spawned.len(), planet);
        }
        update_world_transforms(&mut self.world);

        if let Some(&first) = layout.planets.first() {
            self.focus_body(first);
        }
        Ok(())
    }

    /// Update the simulation by `delta_seconds` of real time. The world
    /// advances in whole `fixed_step` increments; the remainder carries over.
    pub fn update(&mut self, delta_seconds: f32) {
        let step = self.config.fixed_step;
        if step <= 0.0 {
            log::warn!("fixed_step {} is not positive; not updating", step);
            return;
        }
        self.accumulator += delta_seconds.max(0.0) * self.time_scale;
        while self.accumulator >= step {
            self.accumulator -= step;
            self.step(step);
        }
    }

    /// One fixed step of every system, in order.
    fn step(&mut self, dt: f32) {
        self.sim_time += dt as f64;

        orbit_system(&mut self.world, dt as f64);

        let needs_interval = self.config.needs_interval as f64;
        if self.sim_time - self.last_needs_update >= needs_interval {
            let elapsed = (self.sim_time - self.last_needs_update) as f32;
            needs_system(
                &mut self.world,
                &self.bodies,
                &self.config.need_rates,
                &self.config.behavior,
                elapsed,
            );
            self.last_needs_update = self.sim_time;
        }

        goal_system(
            &mut self.world,
            &self.bodies,
            &self.config.behavior,
            &mut self.rng,
            dt,
        );
        movement_system(&mut self.world, dt);

        self.deaths += death_system(&mut self.world).len() as u64;

        let regrowth_interval = self.config.regrowth_interval as f64;
        if self.sim_time - self.last_regrowth_update >= regrowth_interval {
            let elapsed = (self.sim_time - self.last_regrowth_update) as f32;
            regrowth_system(&mut self.world, elapsed, self.config.regrowth_rate);
            self.last_regrowth_update = self.sim_time;
        }

        camera_system(&mut self.camera, dt as f64);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Get current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulated seconds since generation
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Count living blobs
    pub fn blob_count(&self) -> usize {
        self.world.query::<&Blob>().iter().count()
    }

    /// Count bodies with a surface
    pub fn planet_count(&self) -> usize {
        self.world.query::<&Planet>().iter().count()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Blobs that have died since generation
    pub fn death_count(&self) -> u64 {
        self.deaths
    }

    /// Body entities indexed by `BodyId`
    pub fn bodies(&self) -> &[Entity] {
        &self.bodies
    }

    /// All blob entities, ordered by `BlobId`
    pub fn blobs(&self) -> Vec<Entity> {
        let mut blobs: Vec<(BlobId, Entity)> = self
            .world
            .query::<(&Blob, &BlobId)>()
            .iter()
            .map(|(entity, (_, id))| (*id, entity))
            .collect();
        blobs.sort_by_key(|(id, _)| *id);
        blobs.into_iter().map(|(_, entity)| entity).collect()
    }

    pub fn find_blob(&self, id: BlobId) -> Option<Entity> {
        self.world
            .query::<&BlobId>()
            .iter()
            .find(|(_, blob)| **blob == id)
            .map(|(entity, _)| entity)
    }

    /// Find blobs with urgent needs
    pub fn blobs_with_urgent_needs(&self, threshold: f32) -> Vec<(Entity, NeedKind)> {
        find_urgent_needs(&self.world, threshold)
    }

    pub fn blob_report(&self, entity: Entity) -> Option<BlobReport> {
        inspect::blob_report(&self.world, &self.bodies, entity)
    }

    pub fn world_report(&self) -> WorldReport {
        let (average_needs, active_goals) = inspect::population_summary(&self.world);
        WorldReport {
            sim_time: self.sim_time,
            time_scale: self.time_scale,
            blob_count: self.blob_count(),
            deaths: self.deaths,
            bodies: inspect::body_reports(&self.world),
            average_needs,
            active_goals,
        }
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Where the camera is and what it looks at
    pub fn camera_view(&self) -> Option<CameraView> {
        camera_view(&self.world, &self.bodies, &self.camera)
    }

    /// Point the camera at a body or a blob. Returns false for anything else.
    pub fn focus_camera(&mut self, entity: Entity) -> bool {
        let body = self.world.get::<&Body>(entity).ok().map(|b| b.id);
        if let Some(id) = body {
            self.focus_body(id);
            return true;
        }

        let Ok(position) = self.world.get::<&Position>(entity).map(|p| *p) else {
            return false;
        };
        let direction = self
            .bodies
            .get(position.planet as usize)
            .and_then(|&e| self.world.get::<&Planet>(e).ok())
            .map(|p| p.surface.center_direction(position.tile));
        let Some(direction) = direction else {
            return false;
        };

        self.focus_body(position.planet);
        self.camera.hover_over(direction);
        true
    }

    fn focus_body(&mut self, id: BodyId) {
        let radius = self
            .bodies
            .get(id as usize)
            .and_then(|&e| self.world.get::<&Body>(e).ok().map(|b| b.radius))
            .unwrap_or(self.config.planet_radius);
        self.camera.target = id;
        self.camera.orbit.semi_major_axis = radius * self.config.camera_distance;
    }

    /// Save simulation state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_simulation(
            writer,
            &self.world,
            SimulationState {
                sim_time: self.sim_time,
                time_scale: self.time_scale,
                config: &self.config,
                camera: &self.camera,
                next_blob_id: self.next_blob_id,
                deaths: self.deaths,
            },
        )
    }

    /// Load simulation state from a reader
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_simulation(reader)?;

        self.world = loaded.world;
        self.bodies = loaded.bodies;
        self.sim_time = loaded.sim_time;
        self.time_scale = loaded.time_scale;
        self.config = loaded.config;
        self.camera = loaded.camera;
        self.next_blob_id = loaded.next_blob_id;
        self.deaths = loaded.deaths;

        // Continue deterministically from where the save left off
        self.rng = StdRng::seed_from_u64(self.config.seed ^ self.sim_time.to_bits());
        update_world_transforms(&mut self.world);

        // Reset update timers
        self.accumulator = 0.0;
        self.last_needs_update = self.sim_time;
        self.last_regrowth_update = self.sim_time;

        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> WorldConfig {
        WorldConfig {
            planet_count: 2,
            surface_resolution: 6,
            blobs_per_planet: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::default();
        assert_eq!(engine.blob_count(), 0);
        assert_eq!(engine.sim_time(), 0.0);
        assert!(engine.camera_view().is_none());
    }

    #[test]
    fn test_engine_generation() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();

        assert_eq!(engine.planet_count(), 2);
        assert_eq!(engine.body_count(), 5);
        assert!(engine.blob_count() <= 8);
        assert!(engine.camera_view().is_some());
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();

        engine.update(0.05);
        assert_eq!(engine.sim_time(), 0.0);
        engine.update(0.06);
        assert!((engine.sim_time() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale() {
        let mut engine = SimulationEngine::new(small_config());
        engine.set_time_scale(2.0);

        engine.update(1.0); // 1 real second = 2 sim seconds
        // Whole steps only; float drift may leave the last one in the accumulator
        assert!(engine.sim_time() > 1.85 && engine.sim_time() < 2.0 + 1e-4);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut a = SimulationEngine::new(small_config());
        let mut b = SimulationEngine::new(small_config());
        a.generate(21).unwrap();
        b.generate(21).unwrap();
        for _ in 0..30 {
            a.update(0.1);
            b.update(0.1);
        }

        let names = |e: &SimulationEngine| -> Vec<(String, u32)> {
            e.blobs()
                .into_iter()
                .filter_map(|b| e.blob_report(b))
                .map(|r| (r.name, r.tile.0))
                .collect()
        };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn test_focus_camera_on_blob() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();
        let Some(&blob) = engine.blobs().last() else {
            return;
        };
        let planet = engine.blob_report(blob).unwrap().planet;

        assert!(engine.focus_camera(blob));
        assert_eq!(engine.camera().target, planet);

        let view = engine.camera_view().unwrap();
        let distance = (view.eye - view.focus).length();
        assert!((distance - engine.camera().orbit.semi_major_axis).abs() < 1e-6);
    }

    #[test]
    fn test_focus_camera_on_moon() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();
        let moon = engine.bodies()[2];
        let (id, radius) = {
            let body = engine.world.get::<&Body>(moon).unwrap();
            (body.id, body.radius)
        };
        assert_eq!(engine.world.get::<&OrbitalMotion>(moon).unwrap().parent, 1);

        assert!(engine.focus_camera(moon));
        assert_eq!(engine.camera().target, id);
        let expected = radius * engine.config().camera_distance;
        assert!((engine.camera().orbit.semi_major_axis - expected).abs() < 1e-9);

        let view = engine.camera_view().unwrap();
        assert!((view.eye - view.focus).length() > radius);
    }

    #[test]
    fn test_focus_camera_rejects_other_entities() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();
        let stray = engine.world.spawn((Heading(0.0),));
        assert!(!engine.focus_camera(stray));
    }

    #[test]
    fn test_blobs_with_urgent_needs() {
        let mut engine = SimulationEngine::new(small_config());
        engine.generate(5).unwrap();
        let Some(&blob) = engine.blobs().first() else {
            return;
        };
        engine.world.get::<&mut Needs>(blob).unwrap().thirst = 0.95;

        let urgent = engine.blobs_with_urgent_needs(0.9);
        assert_eq!(urgent, vec![(blob, NeedKind::Thirst)]);
    }
}
