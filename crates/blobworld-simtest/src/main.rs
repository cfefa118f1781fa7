//! Blobworld Headless Simulation Harness
//!
//! Validates pure logic, then generates a seeded world and runs it without a
//! renderer. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p blobworld-simtest
//!   cargo run -p blobworld-simtest -- --seed 7 --hours 0.5 --verbose
//!   cargo run -p blobworld-simtest -- --json --save world.bin

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use blobworld_core::prelude::*;
use blobworld_logic::goals::{GoalFailure, GoalKind, GoalStack};
use blobworld_logic::orbit::Orbit;
use blobworld_logic::search::{locate_resource, path_to};
use blobworld_logic::surface::{Resource, Surface, TileId, TileType};
use clap::Parser;

// ── Default world (same JSON shipped in data/) ──────────────────────────
const WORLD_JSON: &str = include_str!("../../../data/world.json");

/// Command-line flags
#[derive(Debug, Parser)]
#[command(name = "blobworld-simtest", about = "Run a Blobworld simulation headless")]
struct Args {
    /// World seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated hours to run
    #[arg(long, default_value_t = 0.1)]
    hours: f64,

    /// JSON world config; defaults to the bundled data/world.json
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every check, not only failures
    #[arg(long)]
    verbose: bool,

    /// Print the final world report as JSON
    #[arg(long)]
    json: bool,

    /// Write the final simulation state to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = match &args.config {
        Some(path) => match WorldConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        },
        None => WorldConfig::from_json_str(WORLD_JSON).unwrap_or_else(|e| {
            log::warn!("bundled world.json unusable ({}); using defaults", e);
            WorldConfig::default()
        }),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    println!("=== Blobworld Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Bundled config
    results.extend(validate_config());

    // 2. Orbital mechanics
    results.extend(validate_orbits(args.verbose));

    // 3. Cube-sphere surface
    results.extend(validate_surface());

    // 4. Goal scheduling
    results.extend(validate_goal_stack());

    // 5. Full simulation run
    let (run_results, engine) = run_simulation(&config, args.hours, args.verbose);
    results.extend(run_results);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if let Some(engine) = &engine {
        if args.json {
            match serde_json::to_string_pretty(&engine.world_report()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("error: could not encode report: {}", e),
            }
        }
        if let Some(path) = &args.save {
            let saved = File::create(path)
                .map_err(SaveError::from)
                .and_then(|file| engine.save(BufWriter::new(file)));
            match saved {
                Ok(()) => log::info!("Saved simulation to {}", path.display()),
                Err(e) => {
                    eprintln!("error: could not save to {}: {}", path.display(), e);
                    std::process::exit(2);
                }
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config() -> Vec<TestResult> {
    println!("--- World Config ---");
    let mut results = Vec::new();

    match WorldConfig::from_json_str(WORLD_JSON) {
        Ok(config) => {
            results.push(TestResult::new(
                "config_parse",
                true,
                format!(
                    "{} planets, {}x{} tiles per face",
                    config.planet_count, config.surface_resolution, config.surface_resolution
                ),
            ));
            results.push(TestResult::new(
                "config_thresholds",
                config.behavior.sated_threshold < config.behavior.critical_threshold,
                format!(
                    "sated {} < critical {}",
                    config.behavior.sated_threshold, config.behavior.critical_threshold
                ),
            ));
        }
        Err(e) => results.push(TestResult::new("config_parse", false, e.to_string())),
    }

    let broken = WorldConfig::from_json_str(r#"{ "fixed_step": 0.0 }"#);
    results.push(TestResult::new(
        "config_rejects_zero_step",
        matches!(broken, Err(ConfigError::Invalid(_))),
        "fixed_step 0 rejected",
    ));

    results
}

// ── 2. Orbits ───────────────────────────────────────────────────────────

fn validate_orbits(verbose: bool) -> Vec<TestResult> {
    println!("--- Orbits ---");
    let mut results = Vec::new();
    let mu = 5.0e6;

    let mut worst_inverse = 0.0f64;
    let mut worst_return = 0.0f64;
    for (i, e) in [0.0, 0.1, 0.4, 0.8, 0.95].iter().enumerate() {
        let Ok(mut orbit) = Orbit::new(1000.0 + 300.0 * i as f64, *e, 0.3, 1.0, 2.0, 0.5) else {
            results.push(TestResult::new("orbit_new", false, format!("e = {}", e)));
            continue;
        };

        let product = orbit.transform() * orbit.inverse_transform();
        let err = (product - glam::DMat4::IDENTITY)
            .to_cols_array()
            .iter()
            .fold(0.0f64, |m, v| m.max(v.abs()));
        worst_inverse = worst_inverse.max(err);

        let start = orbit.position();
        let period = orbit.period(mu);
        for _ in 0..100 {
            orbit.advance(period / 100.0, mu);
        }
        let drift = (orbit.position() - start).length() / orbit.semi_major_axis;
        worst_return = worst_return.max(drift);

        if verbose {
            println!("    e = {:.2}: period {:.1}s, drift {:.2e}", e, period, drift);
        }
    }

    results.push(TestResult::new(
        "orbit_inverse_transform",
        worst_inverse < 1e-9,
        format!("max |T * T^-1 - I| = {:.2e}", worst_inverse),
    ));
    results.push(TestResult::new(
        "orbit_period_return",
        worst_return < 1e-6,
        format!("max relative drift after one period = {:.2e}", worst_return),
    ));
    results.push(TestResult::new(
        "orbit_rejects_unbound",
        Orbit::new(100.0, 1.2, 0.0, 0.0, 0.0, 0.0).is_err(),
        "e >= 1 rejected",
    ));

    results
}

// ── 3. Surface ──────────────────────────────────────────────────────────

fn validate_surface() -> Vec<TestResult> {
    println!("--- Surface ---");
    let mut results = Vec::new();
    let surface = Surface::new(9, 40.0, TileType::Grass);

    let roundtrip_failures = surface
        .iter()
        .filter(|(id, _)| surface.tile_at_direction(surface.center_direction(*id)) != *id)
        .count();
    results.push(TestResult::new(
        "surface_direction_roundtrip",
        roundtrip_failures == 0,
        format!("{} of {} tiles mismatched", roundtrip_failures, surface.len()),
    ));

    let coord_failures = surface
        .iter()
        .filter(|(id, _)| surface.checked_id(surface.coord(*id)) != Some(*id))
        .count();
    results.push(TestResult::new(
        "surface_coord_roundtrip",
        coord_failures == 0,
        format!("{} tiles with bad face coordinates", coord_failures),
    ));

    let asymmetric = surface
        .iter()
        .flat_map(|(id, _)| surface.neighbors(id).map(|n| (id, n)))
        .filter(|(id, n)| !surface.neighbors(*n).contains(id))
        .count();
    results.push(TestResult::new(
        "surface_neighbors_symmetric",
        asymmetric == 0,
        format!("{} one-way adjacencies", asymmetric),
    ));

    // A lake on one face must be found from the opposite side of the planet.
    let lake_world = Surface::from_fn(6, 40.0, |_, d| {
        if d.x > 0.9 {
            TileType::ShallowWater
        } else {
            TileType::Sand
        }
    });
    let far_side = lake_world.tile_at_direction(-glam::DVec3::X);
    let site = locate_resource(&lake_world, far_side, Resource::Water, 32);
    let path_ok = site
        .and_then(|s| path_to(&lake_world, far_side, s.tile, 32).map(|p| p.len() as u32 == s.steps))
        .unwrap_or(false);
    results.push(TestResult::new(
        "search_across_faces",
        path_ok,
        format!("water site {:?}", site.map(|s| (s.tile, s.steps))),
    ));

    results
}

// ── 4. Goal stack ───────────────────────────────────────────────────────

fn validate_goal_stack() -> Vec<TestResult> {
    println!("--- Goal Stack ---");
    let mut results = Vec::new();

    let mut stack = GoalStack::new();
    let stroll = stack.push(GoalKind::Stroll { destination: None }, 0.1);
    let eat = stack.push(GoalKind::Eat, 0.6);
    results.push(TestResult::new(
        "goal_preemption",
        stack.active_id() == Some(eat),
        "eat (0.6) displaces stroll (0.1)",
    ));

    let locate = stack.delegate(
        eat,
        GoalKind::LocateResource {
            resource: Resource::Food,
        },
    );
    if let Some(locate) = locate {
        stack.fail(locate, GoalFailure::NothingFound);
    }
    results.push(TestResult::new(
        "goal_failure_propagates",
        stack.get(eat).is_none() && stack.active_id() == Some(stroll),
        "failed search drops eat, stroll resumes",
    ));

    let attack = stack.push(GoalKind::Attack { target: 1 }, 0.5);
    stack.push(GoalKind::Drink, 0.9);
    let held = stack.active_id() == Some(attack);
    stack.push(
        GoalKind::LocateResource {
            resource: Resource::Air,
        },
        1.2,
    );
    results.push(TestResult::new(
        "attack_resists_interruption",
        held && stack.active_id() != Some(attack),
        "drink 0.9 waits, air 1.2 interrupts",
    ));

    results.push(TestResult::new(
        "idle_is_permanent",
        !stack.complete(stack.idle_id()) && stack.get(stack.idle_id()).is_some(),
        "idle cannot be completed",
    ));

    results
}

// ── 5. Simulation run ───────────────────────────────────────────────────

fn run_simulation(
    config: &WorldConfig,
    hours: f64,
    verbose: bool,
) -> (Vec<TestResult>, Option<SimulationEngine>) {
    println!("--- Simulation (seed {}, {} h) ---", config.seed, hours);
    let mut results = Vec::new();

    let mut engine = SimulationEngine::new(config.clone());
    if let Err(e) = engine.generate(config.seed) {
        results.push(TestResult::new("generate", false, e.to_string()));
        return (results, None);
    }
    let initial = engine.blob_count();
    results.push(TestResult::new(
        "generate",
        engine.planet_count() == config.planet_count as usize,
        format!(
            "{} bodies, {} planets, {} blobs",
            engine.body_count(),
            engine.planet_count(),
            initial
        ),
    ));

    let seconds = (hours.max(0.0) * 3600.0) as u64;
    for second in 0..seconds {
        engine.update(1.0);
        if verbose && second % 60 == 0 {
            let report = engine.world_report();
            println!(
                "    t={:>6.0}s blobs={:>3} deaths={:>3} goals={:?}",
                report.sim_time, report.blob_count, report.deaths, report.active_goals
            );
        }
    }

    results.push(TestResult::new(
        "sim_time_advances",
        (engine.sim_time() - seconds as f64).abs() <= config.fixed_step as f64 + 1e-6,
        format!("{:.1}s simulated", engine.sim_time()),
    ));
    results.push(TestResult::new(
        "blob_accounting",
        engine.blob_count() as u64 + engine.death_count() == initial as u64,
        format!("{} alive + {} dead", engine.blob_count(), engine.death_count()),
    ));

    let reports: Vec<BlobReport> = engine
        .blobs()
        .into_iter()
        .filter_map(|b| engine.blob_report(b))
        .collect();

    let misplaced = reports
        .iter()
        .filter(|r| !r.tile_type.map(TileType::walkable).unwrap_or(false))
        .count();
    results.push(TestResult::new(
        "blobs_on_walkable_tiles",
        misplaced == 0,
        format!("{} blobs off the walkable surface", misplaced),
    ));

    let out_of_range = reports
        .iter()
        .filter(|r| {
            [r.needs.hunger, r.needs.thirst, r.needs.breath]
                .iter()
                .any(|v| !(0.0..=1.0).contains(v))
        })
        .count();
    results.push(TestResult::new(
        "needs_in_range",
        out_of_range == 0,
        format!("{} blobs with needs outside 0..=1", out_of_range),
    ));

    let without_idle = reports
        .iter()
        .filter(|r| !r.goals.iter().any(|g| g.label == "idle"))
        .count();
    results.push(TestResult::new(
        "idle_goal_present",
        without_idle == 0,
        format!("{} goal stacks without idle", without_idle),
    ));

    results.push(TestResult::new(
        "camera_view",
        engine.camera_view().is_some(),
        "camera has a target",
    ));

    // Save / load round trip through a temp file
    let path = std::env::temp_dir().join(format!("blobworld-simtest-{}.bin", config.seed));
    let roundtrip = File::create(&path)
        .map_err(SaveError::from)
        .and_then(|f| engine.save(BufWriter::new(f)))
        .and_then(|_| {
            let mut loaded = SimulationEngine::default();
            loaded.load(BufReader::new(File::open(&path)?))?;
            Ok(loaded.blob_count())
        });
    let _ = std::fs::remove_file(&path);
    results.push(match roundtrip {
        Ok(count) => TestResult::new(
            "save_load_roundtrip",
            count == engine.blob_count(),
            format!("{} blobs restored", count),
        ),
        Err(e) => TestResult::new("save_load_roundtrip", false, e.to_string()),
    });

    if verbose {
        if let Some(first) = reports.first() {
            println!("    sample blob: {} doing {:?}", first.name, first.active_goal);
        }
        let walking: Vec<TileId> = reports.iter().filter_map(|r| r.walking_to).collect();
        println!("    {} blobs walking", walking.len());
        let urgent = engine.blobs_with_urgent_needs(config.behavior.critical_threshold);
        for (entity, need) in &urgent {
            if let Some(report) = engine.blob_report(*entity) {
                println!(
                    "    {} urgently needs {} ({:?})",
                    report.name,
                    need.label(),
                    report.active_goal
                );
            }
        }
    }

    (results, Some(engine))
}
