//! Drone session orchestration: configuration, the fixed-step scheduler and HUD telemetry.

pub mod config;
pub mod simulation;
pub mod telemetry;

pub use config::*;
pub use simulation::*;
pub use telemetry::*;
