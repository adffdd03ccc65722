//! CyberDrone - headless drone flight simulation
//!
//! Runs a scripted flight through the full input, energy, flight, physics and camera
//! pipeline at a fixed frame rate and logs telemetry once per simulated second.
//!
//! Usage: `cyberdrone [seconds]` (default 20). Tunables come from `config.ron`;
//! `cyberdrone --write-config` writes the defaults there and exits.

use std::time::Duration;

use anyhow::{Context, Result};
use engine_core::Vec3;
use input::{InputState, KeyCode};

use game::{DroneSimulation, SimConfig};

const DEFAULT_DURATION_SECS: f32 = 20.0;
const FRAME_DELTA: Duration = Duration::from_micros(16_667);

/// Keys held from `start` until `end`, in simulated seconds.
struct Hold {
    start: f32,
    end: f32,
    keys: &'static [KeyCode],
}

/// Scripted pilot: take off, fly forward, boost, turn, then hover and let it recharge.
const FLIGHT_SCRIPT: &[Hold] = &[
    Hold {
        start: 0.0,
        end: 2.5,
        keys: &[KeyCode::ShiftLeft],
    },
    Hold {
        start: 2.5,
        end: 2.6,
        keys: &[KeyCode::KeyW],
    },
    Hold {
        start: 2.6,
        end: 5.0,
        keys: &[KeyCode::ShiftLeft],
    },
    Hold {
        start: 5.0,
        end: 6.5,
        keys: &[KeyCode::ShiftLeft, KeyCode::Space],
    },
    Hold {
        start: 8.0,
        end: 8.4,
        keys: &[KeyCode::KeyE],
    },
    Hold {
        start: 10.0,
        end: 10.1,
        keys: &[KeyCode::KeyD],
    },
];

/// Single key taps (camera hotkeys).
const CAMERA_TAPS: &[(f32, KeyCode)] = &[
    (4.0, KeyCode::Digit1),
    (7.0, KeyCode::Digit7),
    (12.0, KeyCode::Digit5),
    (16.0, KeyCode::Digit3),
];

/// Side gust partway through the hover.
const GUST_AT: f32 = 13.0;
const GUST_IMPULSE: Vec3 = Vec3::new(1.5, 0.0, 0.0);

fn held_keys(t: f32) -> Vec<KeyCode> {
    FLIGHT_SCRIPT
        .iter()
        .filter(|hold| t >= hold.start && t < hold.end)
        .flat_map(|hold| hold.keys.iter().copied())
        .collect()
}

/// Bring `input` in line with the script at time `t` (previous frame at `prev_t`).
fn drive_input(input: &mut InputState, prev_t: f32, t: f32) {
    let wanted = held_keys(t);
    for key in held_keys(prev_t) {
        if !wanted.contains(&key) {
            input.release(key);
        }
    }
    for &key in &wanted {
        if !input.is_key_held(key) {
            input.press(key);
        }
    }

    for &(at, key) in CAMERA_TAPS {
        if input.is_key_held(key) {
            input.release(key);
        }
        if prev_t < at && t >= at {
            input.press(key);
        }
    }
}

fn parse_duration(arg: Option<String>) -> Result<f32> {
    match arg {
        Some(arg) => {
            let secs: f32 = arg
                .parse()
                .with_context(|| format!("invalid duration {:?}, expected seconds", arg))?;
            anyhow::ensure!(
                secs > 0.0 && secs.is_finite(),
                "duration must be positive, got {}",
                secs
            );
            Ok(secs)
        }
        None => Ok(DEFAULT_DURATION_SECS),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--write-config") {
        SimConfig::default().save();
        log::info!("Wrote default config.ron");
        return Ok(());
    }

    let duration = parse_duration(arg)?;
    let config = SimConfig::load();
    log::info!(
        "Starting CyberDrone headless flight ({:.1} s simulated)",
        duration
    );

    let mut sim = DroneSimulation::new(config);
    let mut input = InputState::new();
    let mut prev_t = 0.0_f32;
    let mut next_report = 0.0_f32;

    while sim.time().elapsed_seconds() < duration {
        let t = sim.time().elapsed_seconds();
        input.begin_frame();
        drive_input(&mut input, prev_t, t);
        prev_t = t;

        sim.frame(Some(&input), FRAME_DELTA);
        if t < GUST_AT && sim.time().elapsed_seconds() >= GUST_AT {
            sim.apply_external_impulse(GUST_IMPULSE);
        }

        for event in sim.drain_events() {
            log::info!(
                "[{:6.2}s] {} ({:?})",
                sim.time().elapsed_seconds(),
                event.label(),
                event
            );
        }

        let telemetry = sim.telemetry();
        if telemetry.elapsed >= next_report {
            log::info!("{}", telemetry);
            next_report += 1.0;
        }
    }

    let telemetry = sim.telemetry();
    log::info!(
        "Flight finished: max altitude {:.2} m, energy {:.1}%, {} ticks",
        telemetry.max_altitude,
        telemetry.energy_percent,
        sim.time().tick_count()
    );
    Ok(())
}
