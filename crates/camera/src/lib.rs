//! Camera and the drone chase/orbit/first-person rig.

pub mod camera;
pub mod rig;

pub use camera::*;
pub use rig::*;
