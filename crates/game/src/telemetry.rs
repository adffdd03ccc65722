//! HUD-facing snapshot of the drone state.

use camera::CameraMode;
use std::fmt;

/// Values a HUD shows each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    /// Simulated seconds since the session started.
    pub elapsed: f32,
    pub energy: f32,
    /// 0–100.
    pub energy_percent: f32,
    pub energy_critical: bool,
    pub altitude: f32,
    /// Highest altitude since the last respawn.
    pub max_altitude: f32,
    pub speed: f32,
    pub vertical_speed: f32,
    pub camera_mode: CameraMode,
    pub boost_active: bool,
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:6.2}s | energy {:5.1}% | alt {:6.2} m (max {:6.2}) | \
             speed {:5.2} m/s | vs {:+5.2} m/s | cam {}",
            self.elapsed,
            self.energy_percent,
            self.altitude,
            self.max_altitude,
            self.speed,
            self.vertical_speed,
            self.camera_mode,
        )?;
        if self.boost_active {
            f.write_str(" | BOOST")?;
        }
        if self.energy_critical {
            f.write_str(" | ENERGY CRITICAL")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Telemetry {
        Telemetry {
            elapsed: 3.5,
            energy: 42.0,
            energy_percent: 42.0,
            energy_critical: false,
            altitude: 7.25,
            max_altitude: 9.0,
            speed: 3.0,
            vertical_speed: -1.5,
            camera_mode: CameraMode::Orbit,
            boost_active: false,
        }
    }

    #[test]
    fn readout_has_core_fields() {
        let text = sample().to_string();
        assert!(text.contains("energy  42.0%"), "{}", text);
        assert!(text.contains("alt   7.25 m"), "{}", text);
        assert!(text.contains("vs -1.50"), "{}", text);
        assert!(text.contains("cam orbit"), "{}", text);
        assert!(!text.contains("BOOST"));
        assert!(!text.contains("CRITICAL"));
    }

    #[test]
    fn readout_flags_boost_and_critical() {
        let mut telemetry = sample();
        telemetry.boost_active = true;
        telemetry.energy_critical = true;
        let text = telemetry.to_string();
        assert!(text.ends_with("BOOST | ENERGY CRITICAL"), "{}", text);
    }
}
