//! Flight dynamics: turns smoothed control axes into forces and torques on the drone body.
//!
//! Coordinates are right-handed with -Z forward and +Y up. Positive pitch input noses the
//! drone down (forward flight), positive roll banks right, positive yaw turns right.
//!
//! Forces are submitted to the physics world before it steps; the floor clamp and crash
//! handling run after the step in [`FlightDynamics::post_step`].

use crate::energy::EnergySystem;
use crate::events::DroneEvent;
use engine_core::{leveled, rate_factor, Quat, Vec3};
use input::ControlAxes;
use physics::{FlyerBodyDesc, PhysicsBody, PhysicsWorld};
use serde::{Deserialize, Serialize};

/// Axis along which thrust acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThrustFrame {
    /// The body's local up axis; tilting the drone redirects thrust.
    Body,
    /// World up regardless of attitude.
    World,
}

/// Tunables for the flight model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Force in newtons at full thrust input.
    pub thrust: f32,
    pub pitch_power: f32,
    pub roll_power: f32,
    pub yaw_power: f32,
    pub thrust_frame: ThrustFrame,
    /// Thrust multiplier while boosting.
    pub boost_multiplier: f32,
    /// Extra consumption intensity per second while boosting.
    pub boost_surcharge: f32,
    /// Fraction of the drone's weight cancelled while thrust input is neutral.
    pub hover_compensation: f32,
    /// Thrust magnitude below which hover compensation kicks in.
    pub hover_input_epsilon: f32,
    pub stabilization_enabled: bool,
    /// Slerp rate (1/s) toward level while pitch and roll are released.
    pub stabilization_rate: f32,
    /// Pitch/roll magnitude below which the controls count as released.
    pub stabilization_input_epsilon: f32,
    /// Minimum body height.
    pub ground_clearance: f32,
    /// Spin rate cap in rad/s, applied after every physics step.
    pub max_angular_speed: f32,
    /// Impact speed (m/s) above which a contact counts as a crash.
    pub crash_speed_threshold: f32,
    /// Energy lost per m/s of crash impact speed.
    pub crash_penalty_scale: f32,
    /// Cosmetic body tilt at full pitch/roll input.
    pub visual_tilt_degrees: f32,
    pub visual_tilt_rate: f32,
    pub mass: f32,
    pub half_extents: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            thrust: 25.0,
            pitch_power: 5.0,
            roll_power: 5.0,
            yaw_power: 3.0,
            thrust_frame: ThrustFrame::Body,
            boost_multiplier: 2.0,
            boost_surcharge: 0.8,
            hover_compensation: 0.9,
            hover_input_epsilon: 0.1,
            stabilization_enabled: true,
            stabilization_rate: 3.0,
            stabilization_input_epsilon: 0.1,
            ground_clearance: 0.5,
            max_angular_speed: 7.0,
            crash_speed_threshold: 5.0,
            crash_penalty_scale: 1.0,
            visual_tilt_degrees: 15.0,
            visual_tilt_rate: 5.0,
            mass: 0.8,
            half_extents: Vec3::new(0.3, 0.1, 0.3),
            linear_damping: 0.2,
            angular_damping: 0.5,
        }
    }
}

impl FlightConfig {
    /// Rigid body description matching this config.
    pub fn body_desc(&self) -> FlyerBodyDesc {
        FlyerBodyDesc {
            half_extents: self.half_extents,
            mass: self.mass.max(0.01),
            linear_damping: self.linear_damping.max(0.0),
            angular_damping: self.angular_damping.max(0.0),
        }
    }
}

/// Force and torque submitted for one tick, world frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightForces {
    pub force: Vec3,
    pub torque: Vec3,
}

/// Drives one drone body.
#[derive(Debug)]
pub struct FlightDynamics {
    config: FlightConfig,
    body: Option<PhysicsBody>,
    /// Cosmetic local tilt for the model; never fed back into physics.
    visual_tilt: Quat,
    boost_active: bool,
    last_forces: FlightForces,
    warned_missing_body: bool,
}

impl FlightDynamics {
    pub fn new(config: FlightConfig, body: Option<PhysicsBody>) -> Self {
        Self {
            config,
            body,
            visual_tilt: Quat::IDENTITY,
            boost_active: false,
            last_forces: FlightForces::default(),
            warned_missing_body: false,
        }
    }

    /// Create the drone's rigid body in `world` and drive it.
    pub fn spawn(config: FlightConfig, world: &mut PhysicsWorld, position: Vec3) -> Self {
        let body = world.add_flyer_body(position, &config.body_desc());
        Self::new(config, Some(body))
    }

    pub fn attach_body(&mut self, body: PhysicsBody) {
        self.body = Some(body);
        self.warned_missing_body = false;
    }

    pub fn body(&self) -> Option<&PhysicsBody> {
        self.body.as_ref()
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// True if boost would amplify thrust this tick.
    pub fn boost_engaged(&self, axes: &ControlAxes, energy: &EnergySystem) -> bool {
        axes.boost && energy.has_energy()
    }

    /// Consumption intensity the flight controls demand this tick.
    ///
    /// Proportional to thrust magnitude and tick length; zero thrust draws nothing,
    /// boost adds a fixed surcharge.
    pub fn energy_demand(&self, axes: &ControlAxes, energy: &EnergySystem, dt: f32) -> f32 {
        let mut intensity = axes.thrust().abs() * dt;
        if self.boost_engaged(axes, energy) {
            intensity += self.config.boost_surcharge * dt;
        }
        intensity
    }

    /// Forces and torques for the given axes and body orientation. Pure.
    pub fn compute_forces(
        &self,
        axes: &ControlAxes,
        energy: &EnergySystem,
        rotation: Quat,
        gravity: f32,
        mass: f32,
    ) -> FlightForces {
        if !energy.has_energy() {
            return FlightForces::default();
        }

        let mut thrust = axes.thrust() * self.config.thrust;
        if self.boost_engaged(axes, energy) {
            thrust *= self.config.boost_multiplier;
        }
        let thrust_dir = match self.config.thrust_frame {
            ThrustFrame::Body => rotation * Vec3::Y,
            ThrustFrame::World => Vec3::Y,
        };
        let mut force = thrust_dir * thrust;

        if axes.thrust().abs() < self.config.hover_input_epsilon {
            force += Vec3::Y * gravity * self.config.hover_compensation * mass;
        }

        let local_torque = Vec3::new(
            -axes.pitch() * self.config.pitch_power,
            -axes.yaw() * self.config.yaw_power,
            -axes.roll() * self.config.roll_power,
        );

        FlightForces {
            force,
            torque: rotation * local_torque,
        }
    }

    /// Submit this tick's forces and apply self-levelling. Call before the physics step.
    ///
    /// Without energy the body gets no propulsive or control force and falls freely.
    pub fn step(
        &mut self,
        world: &mut PhysicsWorld,
        axes: &ControlAxes,
        energy: &EnergySystem,
        dt: f32,
    ) {
        let Some(body) = self.body else {
            self.warn_missing_body();
            return;
        };
        let Some(transform) = world.get_body_transform(body.rigid_body) else {
            self.warn_missing_body();
            return;
        };

        self.boost_active = self.boost_engaged(axes, energy);
        let forces = self.compute_forces(
            axes,
            energy,
            transform.rotation,
            world.gravity_magnitude(),
            body.mass,
        );
        world.set_body_forces(body.rigid_body, forces.force, forces.torque);
        self.last_forces = forces;

        let released = axes.pitch().abs() < self.config.stabilization_input_epsilon
            && axes.roll().abs() < self.config.stabilization_input_epsilon;
        if self.config.stabilization_enabled && energy.has_energy() && released {
            let target = leveled(transform.rotation);
            let rotation = transform
                .rotation
                .slerp(target, rate_factor(self.config.stabilization_rate, dt));
            world.set_body_rotation(body.rigid_body, rotation);
        }
    }

    /// Floor clamp, spin cap and crash handling. Call after the physics step.
    pub fn post_step(
        &mut self,
        world: &mut PhysicsWorld,
        energy: &mut EnergySystem,
        events: &mut Vec<DroneEvent>,
    ) {
        let Some(body) = self.body else {
            return;
        };
        world.clamp_to_floor(body.rigid_body, self.config.ground_clearance);
        world.clamp_angular_speed(body.rigid_body, self.config.max_angular_speed);

        for contact in world.contacts() {
            if !contact.involves(body.rigid_body) {
                continue;
            }
            self.handle_impact(contact.relative_speed, energy, events);
        }
    }

    /// Apply crash damage for an impact at `speed`. Returns true if it counted as a crash.
    pub fn handle_impact(
        &self,
        speed: f32,
        energy: &mut EnergySystem,
        events: &mut Vec<DroneEvent>,
    ) -> bool {
        if speed <= self.config.crash_speed_threshold {
            return false;
        }
        log::warn!("Drone crash! Velocity: {:.1} m/s", speed);
        energy.apply_impact_penalty(speed * self.config.crash_penalty_scale);
        events.push(DroneEvent::CrashImpact { speed });
        true
    }

    /// Ease the cosmetic tilt toward the current pitch/roll input. Render-rate.
    pub fn update_visual_tilt(&mut self, axes: &ControlAxes, dt: f32) {
        let max_tilt = self.config.visual_tilt_degrees.to_radians();
        let target = Quat::from_rotation_x(-axes.pitch() * max_tilt)
            * Quat::from_rotation_z(-axes.roll() * max_tilt);
        self.visual_tilt = self
            .visual_tilt
            .slerp(target, rate_factor(self.config.visual_tilt_rate, dt));
    }

    pub fn visual_tilt(&self) -> Quat {
        self.visual_tilt
    }

    /// Boost state as of the last step.
    pub fn boost_active(&self) -> bool {
        self.boost_active
    }

    /// Forces submitted in the last step.
    pub fn last_forces(&self) -> FlightForces {
        self.last_forces
    }

    /// Clear per-session state (respawn).
    pub fn reset(&mut self) {
        self.visual_tilt = Quat::IDENTITY;
        self.boost_active = false;
        self.last_forces = FlightForces::default();
    }

    fn warn_missing_body(&mut self) {
        if !self.warned_missing_body {
            log::warn!("Flight dynamics has no rigid body, skipping forces");
            self.warned_missing_body = true;
        }
    }
}
