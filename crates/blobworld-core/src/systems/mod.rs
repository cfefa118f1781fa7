//! Systems - logic that operates on components

mod camera;
mod goals;
mod lifecycle;
mod movement;
mod needs;
mod orbit;

pub use camera::*;
pub use goals::*;
pub use lifecycle::*;
pub use movement::*;
pub use needs::*;
pub use orbit::*;
