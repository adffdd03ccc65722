//! Time management for the simulation loop.
//!
//! Frame time is accumulated and paid out in fixed ticks so flight and energy run at a
//! deterministic rate, while the camera runs once per (variable) frame.

use std::time::{Duration, Instant};

/// Fixed tick rate used when none is configured.
pub const DEFAULT_FIXED_RATE_HZ: f64 = 50.0;

/// Upper bound on time accumulated in a single frame, so a long stall does not
/// trigger a burst of catch-up ticks.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total simulated time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed tick count since start.
    tick_count: u64,
    /// Fixed timestep for physics.
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager at the default fixed rate.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            tick_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / DEFAULT_FIXED_RATE_HZ),
            accumulator: Duration::ZERO,
        }
    }

    /// Create a time manager with the given fixed rate in Hz.
    pub fn with_fixed_rate(hz: f64) -> Self {
        let mut time = Self::new();
        time.set_fixed_rate(hz);
        time
    }

    /// Update timing from the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    /// Advance by an explicit frame duration (headless runs and tests).
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta.min(MAX_FRAME_DELTA);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.accumulator += self.delta;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of fixed ticks handed out so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.tick_count += 1;
            true
        } else {
            false
        }
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }

    /// Set the fixed timestep rate in Hz. Non-positive rates are ignored.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        if hz <= 0.0 || !hz.is_finite() {
            log::warn!(
                "Ignoring invalid fixed rate {} Hz, keeping {:?}",
                hz,
                self.fixed_timestep
            );
            return;
        }
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ticks_follow_accumulated_time() {
        let mut time = Time::with_fixed_rate(50.0);
        time.advance(Duration::from_millis(50));
        let mut ticks = 0;
        while time.should_fixed_update() {
            ticks += 1;
        }
        assert_eq!(ticks, 2);
        assert_eq!(time.tick_count(), 2);

        // 10 ms left over + 10 ms = one more tick
        time.advance(Duration::from_millis(10));
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }

    #[test]
    fn long_frames_are_capped() {
        let mut time = Time::with_fixed_rate(50.0);
        time.advance(Duration::from_secs(5));
        assert_eq!(time.delta(), MAX_FRAME_DELTA);
    }

    #[test]
    fn invalid_rate_is_ignored() {
        let mut time = Time::with_fixed_rate(60.0);
        time.set_fixed_rate(0.0);
        assert!((time.fixed_timestep_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }
}
