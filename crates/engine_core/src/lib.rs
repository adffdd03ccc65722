//! Core engine types and utilities for the drone simulation.
//!
//! This crate provides the foundational types used across all simulation systems:
//! - Transform and rigid-body pose components
//! - Fixed-step time management
//! - Damped smoothing helpers shared by flight and camera code

pub mod components;
pub mod math;
pub mod time;
pub mod transform;

pub use components::*;
pub use math::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
