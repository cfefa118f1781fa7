//! Goal system - runs the active goal of every blob
//!
//! Each blob's components are copied into a [`BlobState`], stepped against its
//! planet's surface, then written back. Damage dealt to other blobs is
//! collected and applied once every blob has acted.

use blobworld_logic::goals::{GoalEvent, GoalFailure, GoalKind, GoalStack};
use blobworld_logic::search::{locate_resource, path_to, tiles_within};
use blobworld_logic::surface::{Resource, Surface, TileId};
use hecs::{Entity, World};
use rand::Rng;

use crate::components::{
    Blob, BlobId, GoalTimer, Goals, Heading, Health, Movement, Name, NeedKind, Needs, Planet,
    Position, Traits,
};
use crate::config::BehaviorConfig;

/// What other blobs can see of a blob this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobSnapshot {
    pub id: BlobId,
    pub position: Position,
    pub alive: bool,
}

/// Working copy of one blob's behaviour-relevant components.
#[derive(Debug, Clone)]
pub struct BlobState {
    pub id: BlobId,
    pub position: Position,
    pub heading: f32,
    pub needs: Needs,
    pub traits: Traits,
    pub goals: GoalStack,
    pub timer: GoalTimer,
    pub movement: Option<Movement>,
}

impl BlobState {
    fn load(world: &World, entity: Entity) -> Option<Self> {
        let mut query = world
            .query_one::<(
                &BlobId,
                &Position,
                &Heading,
                &Needs,
                &Traits,
                &Goals,
                Option<&GoalTimer>,
                Option<&Movement>,
            )>(entity)
            .ok()?;
        let (id, position, heading, needs, traits, goals, timer, movement) = query.get()?;
        Some(Self {
            id: *id,
            position: *position,
            heading: heading.0,
            needs: *needs,
            traits: *traits,
            goals: goals.0.clone(),
            timer: timer.copied().unwrap_or_default(),
            movement: movement.cloned(),
        })
    }

    fn store(self, world: &mut World, entity: Entity) {
        let _ = world.insert(
            entity,
            (
                Heading(self.heading),
                self.needs,
                Goals(self.goals),
                self.timer,
            ),
        );
        match self.movement {
            Some(movement) => {
                let _ = world.insert_one(entity, movement);
            }
            None => {
                let _ = world.remove_one::<Movement>(entity);
            }
        }
    }
}

/// Damage one blob inflicts on another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: BlobId,
    pub amount: f32,
}

/// Step every blob's active goal by `dt` seconds.
pub fn goal_system(
    world: &mut World,
    bodies: &[Entity],
    config: &BehaviorConfig,
    rng: &mut impl Rng,
    dt: f32,
) {
    let snapshots: Vec<BlobSnapshot> = world
        .query::<(&Blob, &BlobId, &Position, &Health)>()
        .iter()
        .map(|(_, (_, id, position, health))| BlobSnapshot {
            id: *id,
            position: *position,
            alive: !health.is_dead(),
        })
        .collect();

    let mut blobs: Vec<(BlobId, Entity)> = world
        .query::<(&Blob, &BlobId)>()
        .iter()
        .map(|(entity, (_, id))| (*id, entity))
        .collect();
    blobs.sort_by_key(|(id, _)| *id);

    let mut hits = Vec::new();
    for &(_, entity) in &blobs {
        let Some(mut state) = BlobState::load(world, entity) else {
            continue;
        };
        let Some(&planet) = bodies.get(state.position.planet as usize) else {
            continue;
        };

        {
            let Ok(mut planet) = world.get::<&mut Planet>(planet) else {
                continue;
            };
            if let Some(hit) = step_blob(&mut state, &mut planet.surface, &snapshots, config, rng, dt)
            {
                hits.push(hit);
            }
        }

        let events = state.goals.drain_events();
        if !events.is_empty() {
            let name = world
                .get::<&Name>(entity)
                .map(|n| n.0.clone())
                .unwrap_or_else(|_| format!("blob #{}", state.id.0));
            log_events(&name, &events);
        }

        state.store(world, entity);
    }

    for hit in hits {
        if let Some(&(_, entity)) = blobs.iter().find(|(id, _)| *id == hit.target) {
            if let Ok(mut health) = world.get::<&mut Health>(entity) {
                health.damage(hit.amount);
            }
        }
    }
}

fn log_events(name: &str, events: &[GoalEvent]) {
    for event in events {
        match event {
            GoalEvent::Started { kind, .. } => log::trace!("{}: started {}", name, kind.label()),
            GoalEvent::Resumed { kind, .. } => log::trace!("{}: resumed {}", name, kind.label()),
            GoalEvent::Interrupted { id, by } => {
                log::debug!("{}: goal #{} interrupted by #{}", name, id, by)
            }
            GoalEvent::Delegated { parent, child } => {
                log::trace!("{}: goal #{} delegated to #{}", name, parent, child)
            }
            GoalEvent::Completed { kind, .. } => {
                log::trace!("{}: completed {}", name, kind.label())
            }
            GoalEvent::Failed { kind, reason, .. } => {
                log::debug!("{}: {} failed ({})", name, kind.label(), reason.label())
            }
        }
    }
}

/// Run the active goal of one blob. Returns damage dealt, if any.
pub fn step_blob(
    state: &mut BlobState,
    surface: &mut Surface,
    others: &[BlobSnapshot],
    config: &BehaviorConfig,
    rng: &mut impl Rng,
    dt: f32,
) -> Option<Hit> {
    let active = *state.goals.active()?;

    // A different goal took over: start it from scratch.
    if state.timer.goal != Some(active.id) {
        state.timer = GoalTimer {
            goal: Some(active.id),
            elapsed: 0.0,
        };
        state.movement = None;
    }
    state.timer.elapsed += dt;
    let elapsed = state.timer.elapsed;
    let here = state.position.tile;

    match active.kind {
        GoalKind::Idle => {
            if elapsed >= config.idle_time {
                let next = if rng.gen_bool(0.5) {
                    GoalKind::LookAround
                } else {
                    GoalKind::Stroll { destination: None }
                };
                state.timer.elapsed = 0.0;
                state.goals.push(next, config.wander_urgency);
            }
        }

        GoalKind::LookAround => {
            state.heading = (state.heading + config.look_turn_rate * dt)
                .rem_euclid(std::f32::consts::TAU);
            if elapsed >= config.look_time {
                let target = pick_target(state, surface, others, rng);
                state.goals.complete(active.id);
                if let Some(target) = target {
                    let urgency = config.attack_urgency * (0.5 + state.traits.aggression);
                    state.goals.push(GoalKind::Attack { target: target.0 }, urgency);
                }
            }
        }

        GoalKind::Stroll { destination: None } => {
            let options: Vec<TileId> = tiles_within(surface, here, config.stroll_radius)
                .into_iter()
                .filter(|(tile, steps)| {
                    *steps > 0 && surface.ubiquity(*tile, Resource::Air) > 0.0
                })
                .map(|(tile, _)| tile)
                .collect();
            if options.is_empty() {
                state.goals.fail(active.id, GoalFailure::NoPath);
                return None;
            }
            let destination = options[rng.gen_range(0..options.len())];
            if walk_to(state, surface, destination, config.stroll_radius) {
                state.goals.update_kind(
                    active.id,
                    GoalKind::Stroll {
                        destination: Some(destination),
                    },
                );
            } else {
                state.goals.fail(active.id, GoalFailure::NoPath);
            }
        }

        GoalKind::Stroll {
            destination: Some(destination),
        } => {
            if here == destination {
                state.goals.complete(active.id);
            } else if state.movement.is_none()
                && !walk_to(state, surface, destination, config.stroll_radius * 2)
            {
                state.goals.fail(active.id, GoalFailure::NoPath);
            }
        }

        GoalKind::LocateResource { resource } => {
            if surface.ubiquity(here, resource) > 0.0 {
                state.goals.complete(active.id);
                return None;
            }
            if state.movement.as_ref().is_some_and(|m| !m.is_finished()) {
                return None;
            }
            match locate_resource(surface, here, resource, config.search_radius) {
                Some(site) => {
                    if !walk_to(state, surface, site.tile, config.search_radius) {
                        state.goals.fail(active.id, GoalFailure::NoPath);
                    }
                }
                None => {
                    state.goals.fail(active.id, GoalFailure::NothingFound);
                }
            }
        }

        GoalKind::Eat | GoalKind::Drink => {
            let (need, resource, rate) = if active.kind == GoalKind::Eat {
                (NeedKind::Hunger, Resource::Food, config.eat_rate)
            } else {
                (NeedKind::Thirst, Resource::Water, config.drink_rate)
            };

            if state.needs.get(need) < config.sated_threshold {
                state.goals.complete(active.id);
                return None;
            }
            if surface.ubiquity(here, resource) > 0.0 {
                state.movement = None;
                let nourishment = surface
                    .tile_type(here)
                    .map(|t| t.provides(resource))
                    .unwrap_or(0.0);
                let taken = surface.consume(here, resource, rate * dt);
                state.needs.satisfy(need, taken * nourishment);
            } else {
                state
                    .goals
                    .delegate(active.id, GoalKind::LocateResource { resource });
            }
        }

        GoalKind::Attack { target } => {
            let victim = others
                .iter()
                .find(|o| o.id.0 == target)
                .filter(|o| o.alive);
            let Some(victim) = victim else {
                // Gone or dead: nothing left to do.
                state.goals.complete(active.id);
                return None;
            };
            let reach = state.traits.perception * 2;
            if victim.position.planet != state.position.planet
                || tile_distance(surface, here, victim.position.tile) > reach as f64
            {
                state.goals.fail(active.id, GoalFailure::TargetLost);
                return None;
            }

            let there = victim.position.tile;
            if here == there || surface.neighbors(here).contains(&there) {
                state.movement = None;
                return Some(Hit {
                    target: victim.id,
                    amount: state.traits.strength * dt,
                });
            }

            let chasing = state.movement.as_ref().and_then(Movement::destination) == Some(there);
            if !chasing && !walk_to(state, surface, there, reach + 1) {
                state.goals.fail(active.id, GoalFailure::NoPath);
            }
        }
    }

    None
}

/// Start walking to `destination`. False when it is unreachable.
fn walk_to(state: &mut BlobState, surface: &Surface, destination: TileId, radius: u32) -> bool {
    match path_to(surface, state.position.tile, destination, radius) {
        Some(path) => {
            state.movement = if path.is_empty() {
                None
            } else {
                Some(Movement::new(path))
            };
            true
        }
        None => false,
    }
}

/// Distance between two tiles measured in tile widths.
fn tile_distance(surface: &Surface, a: TileId, b: TileId) -> f64 {
    surface.great_circle_distance(a, b) / surface.tile_spacing()
}

/// Closest living blob within perception, if the blob feels like fighting.
fn pick_target(
    state: &BlobState,
    surface: &Surface,
    others: &[BlobSnapshot],
    rng: &mut impl Rng,
) -> Option<BlobId> {
    let aggression = state.traits.aggression.clamp(0.0, 1.0);
    if aggression <= 0.0 || !rng.gen_bool(aggression as f64) {
        return None;
    }
    let range = state.traits.perception as f64;
    others
        .iter()
        .filter(|o| o.alive && o.id != state.id && o.position.planet == state.position.planet)
        .map(|o| (o.id, tile_distance(surface, state.position.tile, o.position.tile)))
        .filter(|(_, distance)| *distance <= range)
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(id, _)| id)
}
