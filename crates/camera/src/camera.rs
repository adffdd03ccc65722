//! Perspective camera placed by the rig.

use engine_core::{Mat4, Transform, Vec3};

/// Camera with configurable FOV and clipping planes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 70.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the view matrix.
    ///
    /// Uses the camera's own up axis so straight-down views stay well defined.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        let target = eye + self.transform.forward();
        Mat4::look_at_rh(eye, target, self.transform.up())
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get camera forward direction.
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    /// Get camera right direction.
    pub fn right(&self) -> Vec3 {
        self.transform.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Quat;

    #[test]
    fn view_matrix_moves_eye_to_origin() {
        let cam = Camera::new(Vec3::new(3.0, 4.0, 5.0));
        let eye_in_view = cam.view_matrix().transform_point3(cam.position());
        assert!(eye_in_view.length() < 1e-5);
    }

    #[test]
    fn straight_down_view_is_finite() {
        let mut cam = Camera::new(Vec3::new(0.0, 10.0, 0.0));
        cam.transform.rotation = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let view = cam.view_matrix();
        assert!(view.is_finite());
        let below = view.transform_point3(Vec3::ZERO);
        // Ground point is straight ahead: on the -Z axis of view space.
        assert!(below.x.abs() < 1e-4 && below.y.abs() < 1e-4 && below.z < 0.0);
    }

    #[test]
    fn aspect_handles_zero_height() {
        let mut cam = Camera::default();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }
}
