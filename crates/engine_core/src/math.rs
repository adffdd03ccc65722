//! Damped smoothing and orientation helpers.
//!
//! `smooth_damp` is a critically damped spring (the closed-form approximation from
//! Game Programming Gems 4, ch. 1.10). It never overshoots the target and is stable
//! for any positive `dt`, which makes it suitable for both the fixed physics tick
//! and the variable render frame.

use glam::{Mat4, Quat, Vec3};

/// Smallest smooth time accepted; anything lower behaves like a snap.
const MIN_SMOOTH_TIME: f32 = 1.0e-4;

/// Move `current` toward `target` with critically damped motion.
///
/// `velocity` carries the spring state between calls and must be owned by the caller.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = target + (change + temp) * decay;

    // Clamp overshoot: if we passed the target this step, land on it.
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

/// Per-frame interpolation factor for a rate expressed in 1/s, clamped to [0, 1].
pub fn rate_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Rotation whose forward axis (-Z) points from `eye` to `target`.
///
/// Returns `None` when the two points coincide. If the view direction is parallel to
/// `up`, world Z is used as the up hint instead.
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Option<Quat> {
    let dir = target - eye;
    if dir.length_squared() < 1.0e-8 {
        return None;
    }
    let up = if dir.normalize().cross(up).length_squared() < 1.0e-6 {
        Vec3::Z
    } else {
        up
    };
    let view = Mat4::look_at_rh(eye, target, up);
    Some(Quat::from_mat4(&view).inverse().normalize())
}

/// Shortest rotation that levels `rotation` so its local up axis matches world up.
pub fn leveled(rotation: Quat) -> Quat {
    let up = (rotation * Vec3::Y).normalize();
    Quat::from_rotation_arc(up, Vec3::Y) * rotation
}
