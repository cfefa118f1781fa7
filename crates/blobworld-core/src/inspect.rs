//! Inspection - read-only reports over the world
//!
//! These are what a UI panel would show. Everything serializes to JSON so the
//! headless harness can print it.

use std::collections::BTreeMap;

use blobworld_logic::goals::{GoalKind, GoalState};
use blobworld_logic::orbit::Orbit;
use blobworld_logic::surface::{TileId, TileType};
use glam::DVec3;
use hecs::{Entity, World};
use serde::Serialize;

use crate::components::*;

/// One line of a blob's goal list.
#[derive(Debug, Clone, Serialize)]
pub struct GoalLine {
    pub id: u32,
    pub label: String,
    pub urgency: f32,
    pub state: GoalState,
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlobReport {
    pub id: u64,
    pub name: String,
    pub planet: BodyId,
    pub planet_name: String,
    pub tile: TileId,
    pub tile_type: Option<TileType>,
    pub needs: Needs,
    pub health: f32,
    pub max_health: f32,
    pub traits: Traits,
    pub active_goal: Option<String>,
    /// Ranked most urgent first
    pub goals: Vec<GoalLine>,
    pub walking_to: Option<TileId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyReport {
    pub id: BodyId,
    pub name: String,
    pub parent: Option<BodyId>,
    pub radius: f64,
    pub position: DVec3,
    pub orbit: Option<Orbit>,
    /// Seconds per revolution around the parent
    pub period: Option<f64>,
    pub blobs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldReport {
    /// Simulated seconds
    pub sim_time: f64,
    pub time_scale: f32,
    pub blob_count: usize,
    pub deaths: u64,
    pub bodies: Vec<BodyReport>,
    pub average_needs: Needs,
    /// How many blobs are running each kind of goal
    pub active_goals: BTreeMap<String, usize>,
}

fn body_name(world: &World, bodies: &[Entity], id: BodyId) -> String {
    bodies
        .get(id as usize)
        .and_then(|&e| world.get::<&Body>(e).ok().map(|b| b.name.clone()))
        .unwrap_or_else(|| format!("body #{}", id))
}

/// Everything about one blob. `None` if the entity is not a blob.
pub fn blob_report(world: &World, bodies: &[Entity], entity: Entity) -> Option<BlobReport> {
    let mut query = world
        .query_one::<(
            &Blob,
            &BlobId,
            &Name,
            &Position,
            &Needs,
            &Health,
            &Traits,
            &Goals,
            Option<&Movement>,
        )>(entity)
        .ok()?;
    let (_, id, name, position, needs, health, traits, goals, movement) = query.get()?;

    let tile_type = bodies
        .get(position.planet as usize)
        .and_then(|&e| world.get::<&Planet>(e).ok())
        .and_then(|p| p.surface.tile_type(position.tile));

    Some(BlobReport {
        id: id.0,
        name: name.0.clone(),
        planet: position.planet,
        planet_name: body_name(world, bodies, position.planet),
        tile: position.tile,
        tile_type,
        needs: *needs,
        health: health.current,
        max_health: health.max,
        traits: *traits,
        active_goal: goals.0.active().map(|g| g.kind.label()),
        goals: goals
            .0
            .ranked()
            .into_iter()
            .map(|g| GoalLine {
                id: g.id,
                label: g.kind.label(),
                urgency: g.urgency,
                state: g.state,
                depth: g.depth,
            })
            .collect(),
        walking_to: movement.and_then(Movement::destination),
    })
}

/// Every body, in id order.
pub fn body_reports(world: &World) -> Vec<BodyReport> {
    let mut population: BTreeMap<BodyId, usize> = BTreeMap::new();
    for (_, (_, position)) in world.query::<(&Blob, &Position)>().iter() {
        *population.entry(position.planet).or_default() += 1;
    }
    let mus: BTreeMap<BodyId, f64> = world
        .query::<&Body>()
        .iter()
        .map(|(_, b)| (b.id, b.mu))
        .collect();

    let mut reports: Vec<BodyReport> = world
        .query::<(&Body, Option<&OrbitalMotion>, Option<&WorldTransform>)>()
        .iter()
        .map(|(_, (body, motion, transform))| BodyReport {
            id: body.id,
            name: body.name.clone(),
            parent: motion.map(|m| m.parent),
            radius: body.radius,
            position: transform.map(|t| t.position()).unwrap_or(DVec3::ZERO),
            orbit: motion.map(|m| m.orbit),
            period: motion.and_then(|m| {
                mus.get(&m.parent)
                    .filter(|mu| **mu > 0.0)
                    .map(|mu| m.orbit.period(*mu))
            }),
            blobs: population.get(&body.id).copied().unwrap_or(0),
        })
        .collect();
    reports.sort_by_key(|r| r.id);
    reports
}

/// Mean needs over all blobs and a tally of what they are doing.
pub fn population_summary(world: &World) -> (Needs, BTreeMap<String, usize>) {
    let mut total = Needs::default();
    let mut count = 0usize;
    let mut active: BTreeMap<String, usize> = BTreeMap::new();

    for (_, (_, needs, goals)) in world.query::<(&Blob, &Needs, &Goals)>().iter() {
        total.hunger += needs.hunger;
        total.thirst += needs.thirst;
        total.breath += needs.breath;
        count += 1;
        if let Some(goal) = goals.0.active() {
            // Group attacks regardless of target
            let key = match goal.kind {
                GoalKind::Attack { .. } => "attack".to_string(),
                kind => kind.label(),
            };
            *active.entry(key).or_default() += 1;
        }
    }

    if count > 0 {
        let n = count as f32;
        total.hunger /= n;
        total.thirst /= n;
        total.breath /= n;
    }
    (total, active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobworld_logic::surface::Surface;

    fn tiny_world() -> (World, Vec<Entity>, Entity) {
        let mut world = World::new();
        let planet = world.spawn((
            Body::new(0, "Home", 10.0, 0.0),
            Planet {
                surface: Surface::new(2, 10.0, TileType::Grass),
            },
            WorldTransform::default(),
        ));
        let mut goals = Goals::default();
        goals.0.push(GoalKind::Eat, 0.7);
        goals.0.push(GoalKind::Attack { target: 9 }, 0.4);
        let blob = world.spawn((
            Blob,
            BlobId(4),
            Name::new("Glob"),
            Position::new(0, TileId(3)),
            Needs {
                hunger: 0.7,
                ..Default::default()
            },
            Health::new(25.0),
            Traits::default(),
            goals,
        ));
        (world, vec![planet], blob)
    }

    #[test]
    fn test_blob_report() {
        let (world, bodies, blob) = tiny_world();
        let report = blob_report(&world, &bodies, blob).unwrap();

        assert_eq!(report.name, "Glob");
        assert_eq!(report.planet_name, "Home");
        assert_eq!(report.tile_type, Some(TileType::Grass));
        assert_eq!(report.active_goal.as_deref(), Some("eat"));
        assert_eq!(report.goals.len(), 3);
        assert_eq!(report.goals[2].label, "idle");

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"name\":\"Glob\""));
    }

    #[test]
    fn test_non_blob_has_no_report() {
        let (world, bodies, _) = tiny_world();
        assert!(blob_report(&world, &bodies, bodies[0]).is_none());
    }

    #[test]
    fn test_body_reports_count_population() {
        let (world, _, _) = tiny_world();
        let reports = body_reports(&world);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].blobs, 1);
        assert!(reports[0].orbit.is_none());
    }

    #[test]
    fn test_population_summary() {
        let (world, _, _) = tiny_world();
        let (needs, active) = population_summary(&world);
        assert!((needs.hunger - 0.7).abs() < 1e-6);
        assert_eq!(active.get("eat"), Some(&1));
    }
}
