//! Drone flight model: energy budget, force/torque generation and crash handling.

pub mod energy;
pub mod events;
pub mod flight;

pub use energy::*;
pub use events::*;
pub use flight::*;
