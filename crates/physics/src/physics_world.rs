//! Physics world management with Rapier3D.

use crate::collision::{CollisionGroup, Contact, PhysicsBody};
use engine_core::{BodyPose, Quat, Transform, Vec3, Velocity};
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::na::{Isometry3, Quaternion, UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use std::collections::HashMap;

/// Standard gravity magnitude used for new worlds.
pub const STANDARD_GRAVITY: f32 = 9.81;

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_rotation(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn to_quat(rot: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
}

/// Shape and damping of a flying body.
#[derive(Debug, Clone, Copy)]
pub struct FlyerBodyDesc {
    pub half_extents: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for FlyerBodyDesc {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.3, 0.1, 0.3),
            mass: 0.8,
            linear_damping: 0.2,
            angular_damping: 0.5,
        }
    }
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    event_collector: ChannelEventCollector,
    collision_events: Receiver<CollisionEvent>,
    contact_force_events: Receiver<ContactForceEvent>,
    /// Contacts that started during the last step.
    contacts: Vec<Contact>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world with default gravity.
    pub fn new() -> Self {
        let (collision_send, collision_events) = unbounded();
        let (contact_force_send, contact_force_events) = unbounded();
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -STANDARD_GRAVITY, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_events,
            contact_force_events,
            contacts: Vec::new(),
        }
    }

    /// Set the integration timestep (seconds). Must match the fixed tick.
    pub fn set_timestep(&mut self, dt: f32) {
        if dt > 0.0 {
            self.integration_parameters.dt = dt;
        }
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Magnitude of the gravity vector.
    pub fn gravity_magnitude(&self) -> f32 {
        self.gravity.norm()
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    /// Step the physics simulation and collect contacts that started this step.
    pub fn step(&mut self) {
        let pre_step: HashMap<RigidBodyHandle, Vector<Real>> = self
            .rigid_body_set
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(handle, body)| (handle, *body.linvel()))
            .collect();

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        self.contacts.clear();
        while let Ok(event) = self.collision_events.try_recv() {
            if !event.started() {
                continue;
            }
            let body_a = self
                .collider_set
                .get(event.collider1())
                .and_then(|c| c.parent());
            let body_b = self
                .collider_set
                .get(event.collider2())
                .and_then(|c| c.parent());
            let velocity_of = |body: Option<RigidBodyHandle>| {
                body.and_then(|h| pre_step.get(&h).copied())
                    .unwrap_or_else(Vector::<Real>::zeros)
            };
            let relative_speed = (velocity_of(body_a) - velocity_of(body_b)).norm();
            log::debug!(
                "Contact started between {:?} and {:?} at {:.2} m/s",
                body_a,
                body_b,
                relative_speed
            );
            self.contacts.push(Contact {
                body_a,
                body_b,
                relative_speed,
            });
        }
        // Contact force events are not enabled on any collider; drain to keep the channel empty.
        while self.contact_force_events.try_recv().is_ok() {}
    }

    /// Contacts that started during the last step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Add a dynamic box body for a flying craft. Collision events are enabled on it.
    pub fn add_flyer_body(&mut self, position: Vec3, desc: &FlyerBodyDesc) -> PhysicsBody {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(false)
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder::cuboid(
            desc.half_extents.x,
            desc.half_extents.y,
            desc.half_extents.z,
        )
        .mass(desc.mass)
        .collision_groups(CollisionGroup::interaction(CollisionGroup::drone()))
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        PhysicsBody::with_collider(body_handle, collider_handle, desc.mass)
    }

    /// Add a static cuboid collider (walls, pillars). No parent body; collider is fixed in world.
    /// `translation`: world position of center. `rotation_y_rad`: rotation about Y in radians.
    /// `half_extents`: half sizes in local X, Y, Z (after rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let tra = to_vector(translation);
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(CollisionGroup::interaction(CollisionGroup::environment()))
        .build();
        self.collider_set.insert(collider)
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| Transform {
            position: to_vec3(body.translation()),
            rotation: to_quat(body.rotation()),
            scale: Vec3::ONE,
        })
    }

    /// Get the transform and velocity of a rigid body.
    pub fn get_body_pose(&self, handle: RigidBodyHandle) -> Option<BodyPose> {
        self.rigid_body_set.get(handle).map(|body| {
            BodyPose::new(
                Transform {
                    position: to_vec3(body.translation()),
                    rotation: to_quat(body.rotation()),
                    scale: Vec3::ONE,
                },
                Velocity::with_angular(to_vec3(body.linvel()), to_vec3(body.angvel())),
            )
        })
    }

    /// Replace the accumulated force and torque on a body (world frame).
    ///
    /// Rapier keeps user forces until reset, so this clears before adding.
    /// Returns false if the body does not exist.
    pub fn set_body_forces(&mut self, handle: RigidBodyHandle, force: Vec3, torque: Vec3) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.reset_forces(false);
                body.reset_torques(false);
                body.add_force(to_vector(force), true);
                body.add_torque(to_vector(torque), true);
                true
            }
            None => {
                log::warn!("Dropped forces for missing body {:?}", handle);
                false
            }
        }
    }

    /// Overwrite a body's orientation.
    pub fn set_body_rotation(&mut self, handle: RigidBodyHandle, rotation: Quat) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.set_rotation(to_rotation(rotation.normalize()), true);
                true
            }
            None => false,
        }
    }

    /// Overwrite a body's linear and angular velocity.
    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Velocity) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.set_linvel(to_vector(velocity.linear), true);
                body.set_angvel(to_vector(velocity.angular), true);
                true
            }
            None => false,
        }
    }

    /// Inelastic floor: lift a body below `min_height` back onto it and cancel downward motion.
    ///
    /// Returns true if a correction was applied.
    pub fn clamp_to_floor(&mut self, handle: RigidBodyHandle, min_height: f32) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        let mut translation = *body.translation();
        if translation.y >= min_height {
            return false;
        }
        translation.y = min_height;
        body.set_translation(translation, true);

        let mut linvel = *body.linvel();
        if linvel.y < 0.0 {
            linvel.y = 0.0;
            body.set_linvel(linvel, true);
        }
        true
    }

    /// Scale a body's angular velocity down to at most `max_speed` rad/s.
    ///
    /// Returns true if the body was spinning faster and got clamped.
    pub fn clamp_angular_speed(&mut self, handle: RigidBodyHandle, max_speed: f32) -> bool {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return false;
        };
        let angvel = *body.angvel();
        let speed = angvel.norm();
        if speed <= max_speed.max(0.0) || speed <= Real::EPSILON {
            return false;
        }
        body.set_angvel(angvel * (max_speed.max(0.0) / speed), true);
        true
    }

    /// Move a body back to `position`, upright and at rest, with no pending forces.
    pub fn reset_body(&mut self, handle: RigidBodyHandle, position: Vec3) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.set_translation(to_vector(position), true);
                body.set_rotation(Rotation::identity(), true);
                body.set_linvel(Vector::<Real>::zeros(), true);
                body.set_angvel(Vector::<Real>::zeros(), true);
                body.reset_forces(true);
                body.reset_torques(true);
                true
            }
            None => false,
        }
    }

    /// Apply an impulse to a dynamic body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => {
                body.apply_impulse(to_vector(impulse), true);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    fn world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.set_timestep(DT);
        world
    }

    #[test]
    fn free_fall_settles_on_floor() {
        let mut world = world();
        let body = world.add_flyer_body(Vec3::new(0.0, 5.0, 0.0), &FlyerBodyDesc::default());

        let mut clamped_once = false;
        for _ in 0..200 {
            world.step();
            if world.clamp_to_floor(body.rigid_body, 0.5) {
                clamped_once = true;
                let pose = world.get_body_pose(body.rigid_body).unwrap();
                assert!(pose.vertical_speed() >= 0.0);
            }
            let pose = world.get_body_pose(body.rigid_body).unwrap();
            assert!(pose.altitude() >= 0.5);
        }
        assert!(clamped_once);
        let pose = world.get_body_pose(body.rigid_body).unwrap();
        assert_eq!(pose.altitude(), 0.5);
        assert_eq!(pose.vertical_speed(), 0.0);
    }

    #[test]
    fn floor_clamp_is_idempotent() {
        let mut world = world();
        let body = world.add_flyer_body(Vec3::new(2.0, 0.1, -1.0), &FlyerBodyDesc::default());
        world.set_body_velocity(body.rigid_body, Velocity::new(Vec3::new(1.5, -3.0, 0.0)));

        assert!(world.clamp_to_floor(body.rigid_body, 0.5));
        let pose = world.get_body_pose(body.rigid_body).unwrap();
        assert_eq!(pose.altitude(), 0.5);
        assert_eq!(pose.vertical_speed(), 0.0);
        assert_eq!(pose.velocity.linear.x, 1.5);

        assert!(!world.clamp_to_floor(body.rigid_body, 0.5));
        assert_eq!(world.get_body_pose(body.rigid_body).unwrap(), pose);
    }

    #[test]
    fn weight_cancelling_force_holds_altitude() {
        let mut world = world();
        let desc = FlyerBodyDesc::default();
        let body = world.add_flyer_body(Vec3::new(0.0, 3.0, 0.0), &desc);
        let lift = Vec3::Y * world.gravity_magnitude() * desc.mass;
        for _ in 0..50 {
            world.set_body_forces(body.rigid_body, lift, Vec3::ZERO);
            world.step();
        }
        let pose = world.get_body_pose(body.rigid_body).unwrap();
        assert!(
            (pose.altitude() - 3.0).abs() < 0.05,
            "altitude {}",
            pose.altitude()
        );
    }

    #[test]
    fn forces_do_not_persist_after_reset() {
        let mut world = world();
        let body = world.add_flyer_body(Vec3::new(0.0, 10.0, 0.0), &FlyerBodyDesc::default());
        world.set_body_forces(body.rigid_body, Vec3::Y * 100.0, Vec3::ZERO);
        world.step();
        let rising = world
            .get_body_pose(body.rigid_body)
            .unwrap()
            .vertical_speed();
        assert!(rising > 0.0);

        world.set_body_forces(body.rigid_body, Vec3::ZERO, Vec3::ZERO);
        for _ in 0..50 {
            world.step();
        }
        assert!(world.get_body_pose(body.rigid_body).unwrap().vertical_speed() < rising);
    }

    #[test]
    fn impact_reports_relative_speed() {
        let mut world = world();
        world.set_gravity(Vec3::ZERO);
        let desc = FlyerBodyDesc {
            linear_damping: 0.0,
            ..Default::default()
        };
        let body = world.add_flyer_body(Vec3::new(0.0, 2.0, 0.0), &desc);
        world.add_static_cuboid(Vec3::new(0.0, 2.0, -3.0), 0.0, Vec3::new(1.0, 1.0, 0.5));
        world.set_body_velocity(body.rigid_body, Velocity::new(Vec3::new(0.0, 0.0, -10.0)));

        let mut impact = None;
        for _ in 0..60 {
            world.step();
            if let Some(contact) = world
                .contacts()
                .iter()
                .find(|c| c.involves(body.rigid_body))
            {
                impact = Some(*contact);
                break;
            }
        }
        let contact = impact.expect("drone should hit the wall");
        assert!(contact.relative_speed > 9.0 && contact.relative_speed < 10.5);
    }

    #[test]
    fn angular_speed_clamp_keeps_axis() {
        let mut world = world();
        let body = world.add_flyer_body(Vec3::new(0.0, 3.0, 0.0), &FlyerBodyDesc::default());
        let spin = Vec3::new(0.0, 30.0, 40.0);
        world.set_body_velocity(body.rigid_body, Velocity::with_angular(Vec3::ZERO, spin));

        assert!(world.clamp_angular_speed(body.rigid_body, 7.0));
        let angular = world
            .get_body_pose(body.rigid_body)
            .unwrap()
            .velocity
            .angular;
        assert!((angular.length() - 7.0).abs() < 1e-4);
        assert!(angular.normalize().dot(spin.normalize()) > 0.9999);

        assert!(!world.clamp_angular_speed(body.rigid_body, 7.0));
    }

    #[test]
    fn missing_body_is_noop() {
        let mut world = world();
        let body = world.add_flyer_body(Vec3::ZERO, &FlyerBodyDesc::default());
        let mut other = PhysicsWorld::new();
        assert!(!other.set_body_forces(body.rigid_body, Vec3::Y, Vec3::ZERO));
        assert!(!other.clamp_to_floor(body.rigid_body, 0.5));
        assert!(!other.clamp_angular_speed(body.rigid_body, 7.0));
        assert!(other.get_body_pose(body.rigid_body).is_none());
    }
}
