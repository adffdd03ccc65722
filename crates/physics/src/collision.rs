//! Collision groups, body handles and contact reports.

use rapier3d::prelude::*;

/// Collision groups for different body types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (buildings, obstacles)
    Environment = 1 << 0,
    /// Player drone
    Drone = 1 << 1,
}

impl CollisionGroup {
    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for the drone.
    pub fn drone() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Drone as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32);
        (membership, filter)
    }

    pub(crate) fn interaction(groups: (Group, Group)) -> InteractionGroups {
        InteractionGroups::new(groups.0, groups.1)
    }
}

/// Links a simulated object to its physics handles and configured mass.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
    /// Mass assigned at creation, kept so force math does not depend on when Rapier
    /// recomputes mass properties.
    pub mass: f32,
}

impl PhysicsBody {
    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle, mass: f32) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
            mass,
        }
    }
}

/// A contact that began during the last step.
///
/// `body_b` is `None` when the other collider is fixed geometry without a parent body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body_a: Option<RigidBodyHandle>,
    pub body_b: Option<RigidBodyHandle>,
    /// Magnitude of the relative linear velocity just before the step.
    pub relative_speed: f32,
}

impl Contact {
    /// True if either side of the contact is `body`.
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.body_a == Some(body) || self.body_b == Some(body)
    }
}
