//! Multi-mode camera rig following the drone.
//!
//! The rig keeps a damped copy of the drone position (the look target) so small
//! physics jitter never reaches the view. Each mode then derives a desired pose from
//! that target and the drone orientation, and eases the camera toward it. The rig runs
//! once per rendered frame, after physics has settled for that frame.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use crate::Camera;
use engine_core::{look_rotation, rate_factor, smooth_damp, Quat, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Viewpoint strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraMode {
    /// Mounted on the drone, looking where it looks.
    FirstPerson,
    /// Behind and above the drone, looking at it.
    #[default]
    ThirdPerson,
    /// Fixed height above the drone, looking straight down.
    TopDown,
    /// Circling the drone at a fixed radius.
    Orbit,
}

impl CameraMode {
    pub const ALL: [CameraMode; 4] = [
        CameraMode::FirstPerson,
        CameraMode::ThirdPerson,
        CameraMode::TopDown,
        CameraMode::Orbit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CameraMode::FirstPerson => "first-person",
            CameraMode::ThirdPerson => "third-person",
            CameraMode::TopDown => "top-down",
            CameraMode::Orbit => "orbit",
        }
    }
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rig tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Mode the rig starts in.
    pub initial_mode: CameraMode,
    /// Rotation follow rate in 1/s.
    pub follow_speed: f32,
    /// Smooth time for the look target, seconds.
    pub target_smooth_time: f32,
    /// Smooth time for the camera position, seconds.
    pub position_smooth_time: f32,
    pub third_person_distance: f32,
    pub third_person_height: f32,
    /// Mount point in drone-local space. When unset the camera sits
    /// `first_person_forward_offset` ahead of the drone origin.
    pub first_person_mount: Option<Vec3>,
    pub first_person_forward_offset: f32,
    /// Snap to the mount each frame instead of easing.
    pub first_person_snap: bool,
    pub top_down_height: f32,
    /// Orbit angular speed in rad/s.
    pub orbit_speed: f32,
    pub orbit_radius: f32,
    pub orbit_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_mode: CameraMode::ThirdPerson,
            follow_speed: 5.0,
            target_smooth_time: 0.2,
            position_smooth_time: 0.3,
            third_person_distance: 5.0,
            third_person_height: 2.0,
            first_person_mount: None,
            first_person_forward_offset: 0.5,
            first_person_snap: true,
            top_down_height: 10.0,
            orbit_speed: 0.3,
            orbit_radius: 5.0,
            orbit_height: 2.0,
        }
    }
}

/// Straight-down view: forward (-Z) rotated onto -Y, up onto -Z.
fn top_down_rotation() -> Quat {
    Quat::from_rotation_x(-FRAC_PI_2)
}

/// Pose the rig is easing toward this frame.
struct DesiredPose {
    position: Vec3,
    rotation: Quat,
    snap: bool,
}

/// Drives a [`Camera`] from the drone transform.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    mode: CameraMode,
    camera: Camera,
    /// Damped look target. `None` until the first drone pose arrives.
    target: Option<Vec3>,
    target_velocity: Vec3,
    position_velocity: Vec3,
    orbit_time: f32,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            mode: config.initial_mode,
            config,
            camera: Camera::default(),
            target: None,
            target_velocity: Vec3::ZERO,
            position_velocity: Vec3::ZERO,
            orbit_time: 0.0,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switch viewpoint. Damping state is cleared so the new mode starts from rest.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        log::info!("Camera mode switched to: {}", mode);
        self.mode = mode;
        self.position_velocity = Vec3::ZERO;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Damped look target, if the rig has seen the drone.
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Advance one render frame.
    ///
    /// With no drone the camera holds its last pose. The first pose seen snaps the
    /// camera into place instead of sweeping in from the origin.
    pub fn update(&mut self, drone: Option<&Transform>, dt: f32) {
        let Some(drone) = drone else {
            return;
        };

        let first_frame = self.target.is_none();
        let target = match self.target {
            None => drone.position,
            Some(previous) => smooth_damp(
                previous,
                drone.position,
                &mut self.target_velocity,
                self.config.target_smooth_time,
                dt,
            ),
        };
        self.target = Some(target);

        if self.mode == CameraMode::Orbit {
            self.orbit_time += dt;
        }

        let desired = self.desired_pose(drone, target);
        let transform = &mut self.camera.transform;
        if first_frame || desired.snap {
            transform.position = desired.position;
            transform.rotation = desired.rotation;
            self.position_velocity = Vec3::ZERO;
            return;
        }

        transform.position = smooth_damp(
            transform.position,
            desired.position,
            &mut self.position_velocity,
            self.config.position_smooth_time,
            dt,
        );
        transform.rotation = match self.mode {
            // Orbit always faces the target, wherever the eased position lands.
            CameraMode::Orbit => {
                look_rotation(transform.position, target, Vec3::Y).unwrap_or(transform.rotation)
            }
            // Aim from where the camera actually is, not where it is heading.
            CameraMode::ThirdPerson => {
                let aim = look_rotation(transform.position, drone.position, Vec3::Y)
                    .unwrap_or(transform.rotation);
                transform
                    .rotation
                    .slerp(aim, rate_factor(self.config.follow_speed, dt))
                    .normalize()
            }
            _ => transform
                .rotation
                .slerp(desired.rotation, rate_factor(self.config.follow_speed, dt))
                .normalize(),
        };
    }

    fn desired_pose(&self, drone: &Transform, target: Vec3) -> DesiredPose {
        let cfg = &self.config;
        match self.mode {
            CameraMode::FirstPerson => {
                let position = match cfg.first_person_mount {
                    Some(mount) => drone.transform_point(mount),
                    None => drone.position + drone.forward() * cfg.first_person_forward_offset,
                };
                DesiredPose {
                    position,
                    rotation: drone.rotation,
                    snap: cfg.first_person_snap,
                }
            }
            CameraMode::ThirdPerson => {
                let position = target - drone.forward() * cfg.third_person_distance
                    + Vec3::Y * cfg.third_person_height;
                let rotation = look_rotation(position, drone.position, Vec3::Y)
                    .unwrap_or(self.camera.transform.rotation);
                DesiredPose {
                    position,
                    rotation,
                    snap: false,
                }
            }
            CameraMode::TopDown => DesiredPose {
                position: target + Vec3::Y * cfg.top_down_height,
                rotation: top_down_rotation(),
                snap: false,
            },
            CameraMode::Orbit => {
                let angle = self.orbit_time * cfg.orbit_speed;
                let position = target
                    + Vec3::new(
                        angle.sin() * cfg.orbit_radius,
                        cfg.orbit_height,
                        angle.cos() * cfg.orbit_radius,
                    );
                let rotation = look_rotation(position, target, Vec3::Y)
                    .unwrap_or(self.camera.transform.rotation);
                DesiredPose {
                    position,
                    rotation,
                    snap: false,
                }
            }
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run(rig: &mut CameraRig, drone: &Transform, frames: usize) {
        for _ in 0..frames {
            rig.update(Some(drone), DT);
        }
    }

    fn assert_near(a: Vec3, b: Vec3, tol: f32) {
        assert!((a - b).length() < tol, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn top_down_converges_from_any_mode() {
        let drone = Transform::from_position_rotation(
            Vec3::new(4.0, 3.0, -7.0),
            Quat::from_rotation_y(0.8) * Quat::from_rotation_x(0.2),
        );

        for prior in CameraMode::ALL {
            let mut rig = CameraRig::default();
            rig.set_mode(prior);
            run(&mut rig, &drone, 120);

            rig.set_mode(CameraMode::TopDown);
            run(&mut rig, &drone, 600);

            let cam = rig.camera();
            assert_near(cam.position(), drone.position + Vec3::Y * 10.0, 1e-2);
            assert_near(cam.forward(), Vec3::NEG_Y, 1e-2);
        }
    }

    #[test]
    fn third_person_sits_behind_and_above() {
        let drone = Transform::from_position(Vec3::new(0.0, 5.0, 0.0));
        let mut rig = CameraRig::default();
        run(&mut rig, &drone, 600);

        let cam = rig.camera();
        // Drone faces -Z, so behind is +Z.
        assert_near(cam.position(), Vec3::new(0.0, 7.0, 5.0), 1e-2);
        let to_drone = (drone.position - cam.position()).normalize();
        assert!(cam.forward().dot(to_drone) > 0.999);
    }

    #[test]
    fn third_person_follows_yaw() {
        let drone = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_y(FRAC_PI_2),
        );
        let mut rig = CameraRig::default();
        run(&mut rig, &drone, 600);
        // Yawed left 90 degrees: forward is -X, camera sits on +X.
        assert_near(rig.camera().position(), Vec3::new(5.0, 2.0, 0.0), 1e-2);
    }

    #[test]
    fn third_person_keeps_moving_drone_centred() {
        let mut drone = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let mut rig = CameraRig::default();
        for _ in 0..1200 {
            drone.position += Vec3::NEG_Z * 8.0 * DT;
            rig.update(Some(&drone), DT);
        }

        let camera = rig.camera();
        let to_drone = (drone.position - camera.position()).normalize();
        let angle = camera.forward().angle_between(to_drone);
        assert!(
            angle < 1f32.to_radians(),
            "off-centre by {} deg",
            angle.to_degrees()
        );
    }

    #[test]
    fn missing_drone_holds_pose() {
        let drone = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let mut rig = CameraRig::default();
        run(&mut rig, &drone, 30);
        let before = rig.camera().transform;

        for _ in 0..30 {
            rig.update(None, DT);
        }
        assert_eq!(rig.camera().transform, before);
    }

    #[test]
    fn first_person_snaps_to_nose() {
        let mut rig = CameraRig::new(CameraConfig {
            initial_mode: CameraMode::FirstPerson,
            ..Default::default()
        });
        let rotation = Quat::from_rotation_y(0.5);
        let drone = Transform::from_position_rotation(Vec3::new(2.0, 1.0, 0.0), rotation);
        rig.update(Some(&drone), DT);
        rig.update(Some(&drone), DT);

        let cam = rig.camera();
        assert_near(cam.position(), drone.position + drone.forward() * 0.5, 1e-5);
        assert!(cam.transform.rotation.dot(rotation).abs() > 0.99999);
    }

    #[test]
    fn first_person_uses_mount_point() {
        let mount = Vec3::new(0.0, 0.2, -0.4);
        let mut rig = CameraRig::new(CameraConfig {
            initial_mode: CameraMode::FirstPerson,
            first_person_mount: Some(mount),
            ..Default::default()
        });
        let drone = Transform::from_position_rotation(
            Vec3::new(0.0, 3.0, 0.0),
            Quat::from_rotation_y(FRAC_PI_2),
        );
        rig.update(Some(&drone), DT);
        assert_near(rig.camera().position(), drone.transform_point(mount), 1e-5);
    }

    #[test]
    fn orbit_circles_at_radius_and_faces_target() {
        let drone = Transform::from_position(Vec3::new(0.0, 4.0, 0.0));
        let mut rig = CameraRig::new(CameraConfig {
            initial_mode: CameraMode::Orbit,
            ..Default::default()
        });
        run(&mut rig, &drone, 300);
        let first = rig.camera().position();

        for _ in 0..3 {
            run(&mut rig, &drone, 60);
            let cam = rig.camera();
            let offset = cam.position() - drone.position;
            let horizontal = Vec3::new(offset.x, 0.0, offset.z).length();
            assert!((horizontal - 5.0).abs() < 0.1, "radius {}", horizontal);
            assert!((offset.y - 2.0).abs() < 0.1);
            let to_drone = (drone.position - cam.position()).normalize();
            assert!(cam.forward().dot(to_drone) > 0.999);
        }
        assert!((rig.camera().position() - first).length() > 0.5);
    }

    #[test]
    fn mode_switch_is_reported() {
        let mut rig = CameraRig::default();
        assert_eq!(rig.mode(), CameraMode::ThirdPerson);
        rig.set_mode(CameraMode::Orbit);
        assert_eq!(rig.mode(), CameraMode::Orbit);
        assert_eq!(CameraMode::Orbit.to_string(), "orbit");
    }
}
