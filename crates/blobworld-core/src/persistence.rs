//! Save/Load functionality for persisting simulation state
//!
//! Uses bincode for efficient binary serialization of the entire simulation.
//! Components are serialized individually then reconstructed on load. Entity
//! handles are never written: bodies and blobs refer to each other through
//! `BodyId` and `BlobId`.

use std::io::{Read, Write};

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::*;
use crate::config::WorldConfig;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the simulation state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulated seconds
    pub sim_time: f64,
    pub time_scale: f32,
    pub config: WorldConfig,
    pub camera: CameraRig,
    pub next_blob_id: u64,
    pub deaths: u64,
    /// All entities with their components
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    // Bodies
    pub body: Option<Body>,
    pub orbital_motion: Option<OrbitalMotion>,
    pub planet: Option<Planet>,

    // Blobs
    pub blob: Option<Blob>,
    pub blob_id: Option<BlobId>,
    pub name: Option<Name>,
    pub position: Option<Position>,
    pub heading: Option<Heading>,
    pub needs: Option<Needs>,
    pub health: Option<Health>,
    pub traits: Option<Traits>,

    // Behavior
    pub goals: Option<Goals>,
    pub goal_timer: Option<GoalTimer>,
    pub movement: Option<Movement>,
}

/// Extract all entities from a world into serializable form
fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::new();

    for entity_ref in world.iter() {
        let mut se = SerializableEntity::default();

        if let Some(c) = entity_ref.get::<&Body>() {
            se.body = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&OrbitalMotion>() {
            se.orbital_motion = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Planet>() {
            se.planet = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Blob>() {
            se.blob = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&BlobId>() {
            se.blob_id = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Name>() {
            se.name = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&Position>() {
            se.position = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Heading>() {
            se.heading = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Needs>() {
            se.needs = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Health>() {
            se.health = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Traits>() {
            se.traits = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Goals>() {
            se.goals = Some((*c).clone());
        }
        if let Some(c) = entity_ref.get::<&GoalTimer>() {
            se.goal_timer = Some(*c);
        }
        if let Some(c) = entity_ref.get::<&Movement>() {
            se.movement = Some((*c).clone());
        }

        entities.push(se);
    }

    entities
}

/// Spawn an entity with all its components
fn spawn_entity(world: &mut World, se: SerializableEntity) {
    let entity = world.spawn(());

    if let Some(c) = se.body {
        // Transforms are derived state; rebuilt after load
        let _ = world.insert(entity, (c, WorldTransform::default()));
    }
    if let Some(c) = se.orbital_motion {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.planet {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.blob {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.blob_id {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.name {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.position {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.heading {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.needs {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.health {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.traits {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.goals {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.goal_timer {
        let _ = world.insert_one(entity, c);
    }
    if let Some(c) = se.movement {
        let _ = world.insert_one(entity, c);
    }
}

/// Rebuild the body table (`BodyId` -> `Entity`). Ids must be dense.
pub fn body_table(world: &World) -> Result<Vec<Entity>, SaveError> {
    let mut bodies: Vec<(BodyId, Entity)> = world
        .query::<&Body>()
        .iter()
        .map(|(entity, body)| (body.id, entity))
        .collect();
    bodies.sort_by_key(|(id, _)| *id);

    for (index, (id, _)) in bodies.iter().enumerate() {
        if *id as usize != index {
            return Err(SaveError::Corrupt(format!(
                "body ids are not contiguous: expected {}, found {}",
                index, id
            )));
        }
    }
    Ok(bodies.into_iter().map(|(_, entity)| entity).collect())
}

/// Simulation-wide state that lives outside the ECS world.
pub struct SimulationState<'a> {
    pub sim_time: f64,
    pub time_scale: f32,
    pub config: &'a WorldConfig,
    pub camera: &'a CameraRig,
    pub next_blob_id: u64,
    pub deaths: u64,
}

/// Save the complete simulation to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    world: &World,
    state: SimulationState<'_>,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time: state.sim_time,
        time_scale: state.time_scale,
        config: state.config.clone(),
        camera: *state.camera,
        next_blob_id: state.next_blob_id,
        deaths: state.deaths,
        entities: serialize_entities(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a simulation from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut world = World::new();
    for se in save_data.entities {
        spawn_entity(&mut world, se);
    }
    let bodies = body_table(&world)?;

    Ok(LoadedSimulation {
        world,
        bodies,
        sim_time: save_data.sim_time,
        time_scale: save_data.time_scale,
        config: save_data.config,
        camera: save_data.camera,
        next_blob_id: save_data.next_blob_id,
        deaths: save_data.deaths,
    })
}

/// Result of loading a simulation
pub struct LoadedSimulation {
    pub world: World,
    pub bodies: Vec<Entity>,
    pub sim_time: f64,
    pub time_scale: f32,
    pub config: WorldConfig,
    pub camera: CameraRig,
    pub next_blob_id: u64,
    pub deaths: u64,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt save: {0}")]
    Corrupt(String),
}
