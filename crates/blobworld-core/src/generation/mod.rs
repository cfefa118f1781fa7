//! Generation - procedural creation of the star system, surfaces and blobs

mod blobs;
mod names;
mod surface;
mod system;

pub use blobs::*;
pub use names::*;
pub use surface::*;
pub use system::*;
