//! Battery model for the drone.
//!
//! Per tick the order is fixed: consumption (reported by flight before the tick) is
//! already applied, then the critical and depleted edges are checked, then recharge
//! runs if the policy allows it, then the latches are re-evaluated and `Recharged`
//! may fire. Energy is clamped to `[0, max]` at every mutation.

use crate::events::DroneEvent;
use input::ControlAxes;
use serde::{Deserialize, Serialize};

/// When passive recharge is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RechargePolicy {
    /// Every tick.
    Continuous,
    /// Only while every control axis is below the idle threshold.
    WhenIdle,
    /// Whenever this tick drew less than `floor` energy.
    BelowConsumptionFloor { floor: f32 },
}

/// Tunables for the energy budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub max_energy: f32,
    /// Energy drawn per unit of consumption intensity.
    pub consumption_rate: f32,
    /// Energy restored per second while recharging.
    pub recharge_rate: f32,
    /// At or below this level the drone is critical.
    pub critical_threshold: f32,
    /// Axis magnitude under which the pilot counts as idle.
    pub idle_threshold: f32,
    pub recharge_policy: RechargePolicy,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max_energy: 100.0,
            consumption_rate: 10.0,
            recharge_rate: 5.0,
            critical_threshold: 20.0,
            idle_threshold: 0.1,
            recharge_policy: RechargePolicy::WhenIdle,
        }
    }
}

impl EnergyConfig {
    /// Copy with every field forced into a usable range.
    fn sanitized(&self) -> Self {
        let max_energy = if self.max_energy > 0.0 && self.max_energy.is_finite() {
            self.max_energy
        } else {
            log::warn!("Invalid max energy {}, using 100", self.max_energy);
            100.0
        };
        Self {
            max_energy,
            consumption_rate: self.consumption_rate.max(0.0),
            recharge_rate: self.recharge_rate.max(0.0),
            critical_threshold: self.critical_threshold.clamp(0.0, max_energy),
            idle_threshold: self.idle_threshold.max(0.0),
            recharge_policy: self.recharge_policy,
        }
    }
}

/// Bounded energy store with one-shot edge notifications.
#[derive(Debug, Clone)]
pub struct EnergySystem {
    config: EnergyConfig,
    current: f32,
    was_critical: bool,
    was_depleted: bool,
    /// Set by a critical or depleted edge, cleared when `Recharged` fires.
    awaiting_recharge: bool,
    /// Energy drawn since the last tick.
    consumed_this_tick: f32,
}

impl Default for EnergySystem {
    fn default() -> Self {
        Self::new(&EnergyConfig::default())
    }
}

impl EnergySystem {
    /// Start full.
    pub fn new(config: &EnergyConfig) -> Self {
        let config = config.sanitized();
        Self {
            current: config.max_energy,
            config,
            was_critical: false,
            was_depleted: false,
            awaiting_recharge: false,
            consumed_this_tick: 0.0,
        }
    }

    /// Draw `intensity * consumption_rate` energy. Negative intensity draws nothing.
    pub fn consume(&mut self, intensity: f32) {
        let amount = intensity.max(0.0) * self.config.consumption_rate;
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        self.consumed_this_tick += before - self.current;
    }

    /// Add energy directly, saturating at max.
    pub fn recharge(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.config.max_energy);
    }

    /// Remove energy directly (crash damage), not scaled by the consumption rate.
    ///
    /// Damage is not consumption: it never counts against the recharge floor.
    pub fn apply_impact_penalty(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    /// Run the per-tick state machine. Notifications are appended to `events`.
    pub fn tick(&mut self, axes: &ControlAxes, dt: f32, events: &mut Vec<DroneEvent>) {
        self.check_critical(events);
        self.check_depleted(events);

        if self.should_recharge(axes) {
            self.recharge(self.config.recharge_rate * dt.max(0.0));
        }

        self.update_latches(events);
        self.consumed_this_tick = 0.0;
    }

    fn should_recharge(&self, axes: &ControlAxes) -> bool {
        match self.config.recharge_policy {
            RechargePolicy::Continuous => true,
            RechargePolicy::WhenIdle => axes.is_idle(self.config.idle_threshold),
            RechargePolicy::BelowConsumptionFloor { floor } => self.consumed_this_tick < floor,
        }
    }

    fn check_critical(&mut self, events: &mut Vec<DroneEvent>) {
        if self.is_critical() && !self.was_critical {
            self.was_critical = true;
            self.awaiting_recharge = true;
            log::debug!("Energy critical at {:.1}", self.current);
            events.push(DroneEvent::CriticalEnergy);
        }
    }

    fn check_depleted(&mut self, events: &mut Vec<DroneEvent>) {
        if !self.has_energy() && !self.was_depleted {
            self.was_depleted = true;
            self.awaiting_recharge = true;
            log::debug!("Energy depleted");
            events.push(DroneEvent::Depleted);
        }
    }

    fn update_latches(&mut self, events: &mut Vec<DroneEvent>) {
        if self.was_critical && !self.is_critical() {
            self.was_critical = false;
        }
        if self.was_depleted && self.has_energy() {
            self.was_depleted = false;
        }
        if self.awaiting_recharge && self.current >= self.config.max_energy {
            self.awaiting_recharge = false;
            self.was_critical = false;
            self.was_depleted = false;
            log::debug!("Energy recharged");
            events.push(DroneEvent::Recharged);
        }
    }

    /// Back to full with all latches cleared. Emits nothing.
    pub fn reset(&mut self) {
        self.current = self.config.max_energy;
        self.was_critical = false;
        self.was_depleted = false;
        self.awaiting_recharge = false;
        self.consumed_this_tick = 0.0;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.config.max_energy
    }

    /// Fill level in percent (0–100).
    pub fn percentage(&self) -> f32 {
        self.current / self.config.max_energy * 100.0
    }

    pub fn has_energy(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_critical(&self) -> bool {
        self.current <= self.config.critical_threshold
    }

    pub fn config(&self) -> &EnergyConfig {
        &self.config
    }
}
