//! Movement system - walks blobs along their paths

use hecs::World;

use crate::components::{Movement, Position, Traits};

/// Advance every walking blob by `speed * dt` tiles. Blobs that reach the end
/// of their path stop walking.
pub fn movement_system(world: &mut World, dt: f32) {
    let mut arrived = Vec::new();

    for (entity, (position, movement, traits)) in
        world.query_mut::<(&mut Position, &mut Movement, &Traits)>()
    {
        movement.progress += traits.speed.max(0.0) * dt;
        while movement.progress >= 1.0 {
            let Some(next) = movement.path.pop_front() else {
                break;
            };
            position.tile = next;
            movement.progress -= 1.0;
        }
        if movement.is_finished() {
            arrived.push(entity);
        }
    }

    for entity in arrived {
        let _ = world.remove_one::<Movement>(entity);
    }
}
