//! Drone session: owns every subsystem and runs them in a fixed order.
//!
//! Per fixed tick: sample input, charge the energy the controls demand, run the energy
//! state machine, submit flight forces, step physics, then floor clamp and crash
//! contacts. Once per frame, after all due ticks: visual tilt and the camera rig.

use std::time::Duration;

use crate::config::SimConfig;
use crate::telemetry::Telemetry;
use camera::{Camera, CameraMode, CameraRig};
use drone::{DroneEvent, EnergySystem, FlightDynamics};
use engine_core::{BodyPose, Time, Transform, Vec3};
use input::{ControlAxes, InputProcessor, InputState, KeyBindings, KeyCode};
use physics::PhysicsWorld;

/// Keys that switch the camera, edge-triggered.
const CAMERA_HOTKEYS: [(KeyCode, CameraMode); 4] = [
    (KeyCode::Digit1, CameraMode::FirstPerson),
    (KeyCode::Digit3, CameraMode::ThirdPerson),
    (KeyCode::Digit5, CameraMode::TopDown),
    (KeyCode::Digit7, CameraMode::Orbit),
];

pub struct DroneSimulation {
    config: SimConfig,
    time: Time,
    input: InputProcessor,
    energy: EnergySystem,
    flight: FlightDynamics,
    physics: PhysicsWorld,
    rig: CameraRig,
    /// Axes sampled on the latest tick; the render update reads them.
    axes: ControlAxes,
    events: Vec<DroneEvent>,
    max_altitude: f32,
}

impl DroneSimulation {
    pub fn new(config: SimConfig) -> Self {
        let time = Time::with_fixed_rate(config.fixed_rate_hz);
        let mut physics = PhysicsWorld::new();
        physics.set_timestep(time.fixed_timestep_seconds());
        for obstacle in &config.obstacles {
            physics.add_static_cuboid(obstacle.center, obstacle.rotation_y, obstacle.half_extents);
        }

        let flight =
            FlightDynamics::spawn(config.flight.clone(), &mut physics, config.spawn_position);
        log::info!(
            "Drone spawned at {:?} ({} obstacles, {:.0} Hz tick)",
            config.spawn_position,
            config.obstacles.len(),
            1.0 / time.fixed_timestep_seconds()
        );

        Self {
            time,
            input: InputProcessor::new(&config.input, KeyBindings::default()),
            energy: EnergySystem::new(&config.energy),
            flight,
            physics,
            rig: CameraRig::new(config.camera.clone()),
            axes: ControlAxes::default(),
            events: Vec::new(),
            max_altitude: config.spawn_position.y,
            config,
        }
    }

    /// Advance by one frame of `delta`: every due fixed tick, then one render update.
    ///
    /// `input` is `None` when no keyboard is attached; controls then read neutral.
    /// Returns the number of fixed ticks run.
    pub fn frame(&mut self, input: Option<&InputState>, delta: Duration) -> u32 {
        self.time.advance(delta);
        if let Some(input) = input {
            self.handle_hotkeys(input);
        }

        let mut ticks = 0;
        while self.time.should_fixed_update() {
            self.fixed_update(input);
            ticks += 1;
        }

        self.render_update(self.time.delta_seconds());
        ticks
    }

    /// One fixed tick.
    pub fn fixed_update(&mut self, input: Option<&InputState>) {
        let dt = self.time.fixed_timestep_seconds();

        let axes = self.input.sample(input);
        self.axes = axes;

        let demand = self.flight.energy_demand(&axes, &self.energy, dt);
        self.energy.consume(demand);
        self.energy.tick(&axes, dt, &mut self.events);

        self.flight.step(&mut self.physics, &axes, &self.energy, dt);
        self.physics.step();
        self.flight
            .post_step(&mut self.physics, &mut self.energy, &mut self.events);

        if let Some(pose) = self.pose() {
            self.max_altitude = self.max_altitude.max(pose.altitude());
        }
    }

    /// Cosmetic tilt and camera, once per rendered frame.
    pub fn render_update(&mut self, dt: f32) {
        self.flight.update_visual_tilt(&self.axes, dt);
        let drone = self.drone_transform();
        self.rig.update(drone.as_ref(), dt);
    }

    fn handle_hotkeys(&mut self, input: &InputState) {
        for (key, mode) in CAMERA_HOTKEYS {
            if input.is_key_pressed(key) {
                self.rig.set_mode(mode);
            }
        }
    }

    /// Refill the battery and clear its notification latches.
    pub fn reset_energy(&mut self) {
        self.energy.reset();
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        self.rig.set_mode(mode);
    }

    /// Push the drone (wind gust, scripted hit). Returns false if there is no body.
    pub fn apply_external_impulse(&mut self, impulse: Vec3) -> bool {
        let applied = self
            .flight
            .body()
            .map(|body| self.physics.apply_impulse(body.rigid_body, impulse))
            .unwrap_or(false);
        if !applied {
            log::warn!("External impulse {:?} ignored, drone has no body", impulse);
        }
        applied
    }

    /// Back to the spawn point at rest with a full battery.
    pub fn respawn(&mut self) {
        let spawn = self.config.spawn_position;
        if let Some(body) = self.flight.body() {
            self.physics.reset_body(body.rigid_body, spawn);
        }
        self.flight.reset();
        self.energy.reset();
        self.input.reset();
        self.axes = ControlAxes::default();
        self.max_altitude = spawn.y;
        log::info!("Drone respawned at {:?}", spawn);
    }

    /// Take every notification raised since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<DroneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn telemetry(&self) -> Telemetry {
        let pose = self.pose().unwrap_or_default();
        Telemetry {
            elapsed: self.time.elapsed_seconds(),
            energy: self.energy.current(),
            energy_percent: self.energy.percentage(),
            energy_critical: self.energy.is_critical(),
            altitude: pose.altitude(),
            max_altitude: self.max_altitude,
            speed: pose.speed(),
            vertical_speed: pose.vertical_speed(),
            camera_mode: self.rig.mode(),
            boost_active: self.flight.boost_active(),
        }
    }

    /// Physics pose of the drone body.
    pub fn pose(&self) -> Option<BodyPose> {
        let body = self.flight.body()?;
        self.physics.get_body_pose(body.rigid_body)
    }

    pub fn drone_transform(&self) -> Option<Transform> {
        let body = self.flight.body()?;
        self.physics.get_body_transform(body.rigid_body)
    }

    /// Transform for drawing the drone model: physics pose plus cosmetic tilt.
    pub fn model_transform(&self) -> Option<Transform> {
        self.drone_transform().map(|mut transform| {
            transform.rotation = transform.rotation * self.flight.visual_tilt();
            transform
        })
    }

    pub fn camera(&self) -> &Camera {
        self.rig.camera()
    }

    pub fn camera_rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn energy(&self) -> &EnergySystem {
        &self.energy
    }

    pub fn flight(&self) -> &FlightDynamics {
        &self.flight
    }

    pub fn axes(&self) -> &ControlAxes {
        &self.axes
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
