//! Notifications raised by the drone systems.
//!
//! Events are pushed into a caller-owned `Vec` during a tick and drained by whoever
//! runs the session (HUD, game flow). Each variant fires at most once per edge.

/// Something the rest of the game may want to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DroneEvent {
    /// Energy dropped to or below the critical threshold.
    CriticalEnergy,
    /// Energy reached zero; flight forces are cut until it recovers.
    Depleted,
    /// Energy climbed back to full after being critical or depleted.
    Recharged,
    /// The drone hit something faster than the crash threshold.
    CrashImpact { speed: f32 },
}

impl DroneEvent {
    /// Short label for logs and HUD messages.
    pub fn label(&self) -> &'static str {
        match self {
            DroneEvent::CriticalEnergy => "Energy critical",
            DroneEvent::Depleted => "Energy depleted",
            DroneEvent::Recharged => "Energy recharged",
            DroneEvent::CrashImpact { .. } => "Crash impact",
        }
    }
}
