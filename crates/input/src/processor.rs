//! Smoothed drone control axes.
//!
//! Raw key state is discretised to {-1, 0, 1} per channel and then run through a
//! one-pole low-pass filter once per fixed tick. The filter coefficient is a fraction
//! per tick, not a rate per second, so responsiveness scales with the tick rate.

use crate::{InputState, KeyCode};
use engine_core::lerp;
use serde::{Deserialize, Serialize};

/// Tunables for input sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Fraction of the remaining distance to the target covered each tick, in (0, 1].
    pub smoothing_factor: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.3,
        }
    }
}

/// One value per control channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisSet {
    pub thrust: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl AxisSet {
    pub fn new(thrust: f32, pitch: f32, roll: f32, yaw: f32) -> Self {
        Self {
            thrust,
            pitch,
            roll,
            yaw,
        }
    }

    /// Every channel clamped to [-1, 1].
    pub fn clamped(self) -> Self {
        Self {
            thrust: self.thrust.clamp(-1.0, 1.0),
            pitch: self.pitch.clamp(-1.0, 1.0),
            roll: self.roll.clamp(-1.0, 1.0),
            yaw: self.yaw.clamp(-1.0, 1.0),
        }
    }

    /// Largest absolute channel value.
    pub fn max_abs(&self) -> f32 {
        self.thrust
            .abs()
            .max(self.pitch.abs())
            .max(self.roll.abs())
            .max(self.yaw.abs())
    }

    fn lerp_toward(self, target: Self, t: f32) -> Self {
        Self {
            thrust: lerp(self.thrust, target.thrust, t),
            pitch: lerp(self.pitch, target.pitch, t),
            roll: lerp(self.roll, target.roll, t),
            yaw: lerp(self.yaw, target.yaw, t),
        }
    }
}

/// Pilot intent for one tick: raw targets, filtered values, and the boost switch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlAxes {
    /// Discretised key state.
    pub target: AxisSet,
    /// Filtered values read by flight and energy.
    pub current: AxisSet,
    /// Boost key held this tick. Not filtered.
    pub boost: bool,
}

impl ControlAxes {
    /// Axes with the filtered values set directly (scripted control, tests).
    pub fn from_current(current: AxisSet) -> Self {
        let current = current.clamped();
        Self {
            target: current,
            current,
            boost: false,
        }
    }

    pub fn with_boost(mut self, boost: bool) -> Self {
        self.boost = boost;
        self
    }

    pub fn thrust(&self) -> f32 {
        self.current.thrust
    }

    pub fn pitch(&self) -> f32 {
        self.current.pitch
    }

    pub fn roll(&self) -> f32 {
        self.current.roll
    }

    pub fn yaw(&self) -> f32 {
        self.current.yaw
    }

    /// True when every filtered channel is within `threshold` of zero.
    pub fn is_idle(&self, threshold: f32) -> bool {
        self.current.max_abs() < threshold
    }
}

/// Keys driving one axis. Any held positive key contributes +1, any held negative key -1.
#[derive(Debug, Clone)]
pub struct AxisBinding {
    pub positive: Vec<KeyCode>,
    pub negative: Vec<KeyCode>,
}

impl AxisBinding {
    pub fn new(positive: &[KeyCode], negative: &[KeyCode]) -> Self {
        Self {
            positive: positive.to_vec(),
            negative: negative.to_vec(),
        }
    }

    /// Raw value in {-1, 0, 1}.
    pub fn read(&self, input: &InputState) -> f32 {
        let mut value = 0.0;
        if input.is_any_held(&self.positive) {
            value += 1.0;
        }
        if input.is_any_held(&self.negative) {
            value -= 1.0;
        }
        value
    }
}

/// Keyboard layout for the drone.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub thrust: AxisBinding,
    pub pitch: AxisBinding,
    pub roll: AxisBinding,
    pub yaw: AxisBinding,
    pub boost: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            thrust: AxisBinding::new(&[KeyCode::ShiftLeft], &[KeyCode::ControlLeft]),
            pitch: AxisBinding::new(
                &[KeyCode::KeyW, KeyCode::ArrowUp],
                &[KeyCode::KeyS, KeyCode::ArrowDown],
            ),
            roll: AxisBinding::new(
                &[KeyCode::KeyD, KeyCode::ArrowRight],
                &[KeyCode::KeyA, KeyCode::ArrowLeft],
            ),
            yaw: AxisBinding::new(&[KeyCode::KeyE], &[KeyCode::KeyQ]),
            boost: vec![KeyCode::Space],
        }
    }
}

/// Samples key state once per fixed tick and owns the filtered control axes.
#[derive(Debug)]
pub struct InputProcessor {
    bindings: KeyBindings,
    smoothing_factor: f32,
    axes: ControlAxes,
    warned_missing_device: bool,
}

impl InputProcessor {
    pub fn new(config: &InputConfig, bindings: KeyBindings) -> Self {
        let smoothing_factor = if config.smoothing_factor > 0.0 && config.smoothing_factor <= 1.0 {
            config.smoothing_factor
        } else {
            let fixed = config.smoothing_factor.clamp(0.01, 1.0);
            log::warn!(
                "Input smoothing factor {} outside (0, 1], using {}",
                config.smoothing_factor,
                fixed
            );
            fixed
        };
        Self {
            bindings,
            smoothing_factor,
            axes: ControlAxes::default(),
            warned_missing_device: false,
        }
    }

    /// Read raw targets and advance the filter by one tick.
    ///
    /// With no input device the targets are neutral and the filter decays to zero.
    pub fn sample(&mut self, input: Option<&InputState>) -> ControlAxes {
        let (target, boost) = match input {
            Some(input) => (
                AxisSet {
                    thrust: self.bindings.thrust.read(input),
                    pitch: self.bindings.pitch.read(input),
                    roll: self.bindings.roll.read(input),
                    yaw: self.bindings.yaw.read(input),
                }
                .clamped(),
                input.is_any_held(&self.bindings.boost),
            ),
            None => {
                if !self.warned_missing_device {
                    log::warn!("No input device attached, drone controls read neutral");
                    self.warned_missing_device = true;
                }
                (AxisSet::default(), false)
            }
        };

        self.axes.target = target;
        self.axes.current = self
            .axes
            .current
            .lerp_toward(target, self.smoothing_factor)
            .clamped();
        self.axes.boost = boost;
        self.axes
    }

    /// Latest sampled axes.
    pub fn axes(&self) -> &ControlAxes {
        &self.axes
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Drop all filter state back to neutral.
    pub fn reset(&mut self) {
        self.axes = ControlAxes::default();
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(&InputConfig::default(), KeyBindings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(factor: f32) -> InputProcessor {
        InputProcessor::new(
            &InputConfig {
                smoothing_factor: factor,
            },
            KeyBindings::default(),
        )
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        input.press(KeyCode::KeyS);
        let mut p = processor(1.0);
        let axes = p.sample(Some(&input));
        assert_eq!(axes.target.pitch, 0.0);
    }

    #[test]
    fn aliased_keys_do_not_exceed_unit_range() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyW);
        input.press(KeyCode::ArrowUp);
        let mut p = processor(1.0);
        let axes = p.sample(Some(&input));
        assert_eq!(axes.target.pitch, 1.0);
        assert_eq!(axes.current.pitch, 1.0);
    }

    #[test]
    fn smoothing_follows_geometric_decay() {
        let f = 0.2_f32;
        let mut input = InputState::new();
        input.press(KeyCode::ShiftLeft);
        let mut p = processor(f);

        let mut prev_err = 1.0_f32;
        for n in 1..=30 {
            let axes = p.sample(Some(&input));
            let err = (axes.current.thrust - 1.0).abs();
            let expected = (1.0 - f).powi(n);
            assert!(
                (err - expected).abs() < 1e-5,
                "tick {}: {} vs {}",
                n,
                err,
                expected
            );
            assert!(err < prev_err);
            prev_err = err;
        }
    }

    #[test]
    fn missing_device_decays_to_neutral() {
        let mut input = InputState::new();
        input.press(KeyCode::KeyD);
        let mut p = processor(0.5);
        p.sample(Some(&input));
        assert!(p.axes().roll() > 0.0);

        for _ in 0..60 {
            p.sample(None);
        }
        assert!(p.axes().roll().abs() < 1e-6);
        assert_eq!(p.axes().target, AxisSet::default());
        assert!(!p.axes().boost);
    }

    #[test]
    fn boost_is_unfiltered() {
        let mut input = InputState::new();
        input.press(KeyCode::Space);
        let mut p = processor(0.1);
        assert!(p.sample(Some(&input)).boost);
        input.release(KeyCode::Space);
        assert!(!p.sample(Some(&input)).boost);
    }

    #[test]
    fn idle_detection_uses_filtered_values() {
        let axes = ControlAxes::from_current(AxisSet::new(0.05, -0.02, 0.0, 0.09));
        assert!(axes.is_idle(0.1));
        let axes = ControlAxes::from_current(AxisSet::new(0.0, 0.0, -0.2, 0.0));
        assert!(!axes.is_idle(0.1));
    }

    #[test]
    fn out_of_range_factor_is_clamped() {
        let p = processor(0.0);
        assert!(p.smoothing_factor() > 0.0);
        let p = processor(3.0);
        assert_eq!(p.smoothing_factor(), 1.0);
    }
}
