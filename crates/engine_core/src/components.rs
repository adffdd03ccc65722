//! Common components shared by the physics, flight and camera systems.

use crate::transform::Transform;
use glam::Vec3;

/// Linear and angular velocity of a moving body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl Velocity {
    pub fn new(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }

    pub fn with_angular(linear: Vec3, angular: Vec3) -> Self {
        Self { linear, angular }
    }
}

/// Snapshot of a rigid body after integration: where it is and how it moves.
///
/// Produced by the physics world once per tick; read by the camera rig and telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyPose {
    pub transform: Transform,
    pub velocity: Velocity,
}

impl BodyPose {
    pub fn new(transform: Transform, velocity: Velocity) -> Self {
        Self { transform, velocity }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Height above the world origin plane.
    pub fn altitude(&self) -> f32 {
        self.transform.position.y
    }

    /// Magnitude of linear velocity.
    pub fn speed(&self) -> f32 {
        self.velocity.linear.length()
    }

    pub fn vertical_speed(&self) -> f32 {
        self.velocity.linear.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_telemetry() {
        let pose = BodyPose::new(
            Transform::from_position(Vec3::new(1.0, 4.5, 2.0)),
            Velocity::new(Vec3::new(3.0, -4.0, 0.0)),
        );
        assert_eq!(pose.altitude(), 4.5);
        assert!((pose.speed() - 5.0).abs() < 1e-6);
        assert_eq!(pose.vertical_speed(), -4.0);
    }
}
