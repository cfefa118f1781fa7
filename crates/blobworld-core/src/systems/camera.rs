//! Camera system - keeps the rig orbiting its target body

use glam::DMat4;
use hecs::{Entity, World};

use crate::components::{CameraRig, CameraView, WorldTransform};

/// Move the camera along its orbit.
pub fn camera_system(rig: &mut CameraRig, dt: f64) {
    rig.orbit.mean_anomaly =
        blobworld_logic::orbit::wrap_angle(rig.orbit.mean_anomaly + rig.speed * dt);
}

/// Current view of the rig's target. `None` if the target body is gone.
pub fn camera_view(world: &World, bodies: &[Entity], rig: &CameraRig) -> Option<CameraView> {
    let entity = *bodies.get(rig.target as usize)?;
    let focus = world.get::<&WorldTransform>(entity).ok()?.position();
    let eye = focus + rig.orbit.position();
    let view = rig.orbit.look_at_center(rig.up) * DMat4::from_translation(-focus);
    Some(CameraView { eye, focus, view })
}
