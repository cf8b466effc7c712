//! Software-in-the-loop host for the barometer module.
//!
//! Replays a simulated hike through the module exactly as a device would
//! deliver it and prints every `barometerUpdate` payload as a JSON line.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use altimeter::BarometerConfig;
use anyhow::Context;
use bridge::{Barometer, BarometerPayload, HostLifecycle};
use clap::Parser;
use hal::STANDARD_ATMOSPHERE_HPA;
use log::info;

use profile::PressureProfile;
use sim_sensor::SimulatedPressureSensor;

mod profile;
mod sim_sensor;

#[derive(Parser, Debug)]
#[command(name = "sitl", about = "Replay a simulated pressure trace through the barometer module")]
struct Cli {
    /// Minimum time between emitted readings
    #[arg(long, default_value_t = 200)]
    interval_ms: u32,

    /// Weight of the previous smoothed pressure, in [0, 1]
    #[arg(long, default_value_t = 0.7)]
    smoothing: f64,

    /// Local sea-level-equivalent pressure in hPa
    #[arg(long, default_value_t = STANDARD_ATMOSPHERE_HPA)]
    local_pressure: f64,

    /// Readings discarded before the relative altitude baseline is latched
    #[arg(long, default_value_t = 10)]
    ignore_samples: u32,

    /// Rate at which the simulated hardware produces raw samples
    #[arg(long, default_value_t = 50)]
    hardware_rate_hz: u32,

    /// How long to run
    #[arg(long, default_value_t = 45)]
    duration_s: u64,

    /// Pause delivery for this many seconds halfway through, as a backgrounded app would
    #[arg(long)]
    pause_s: Option<u64>,

    /// Pretend the device has no pressure sensor
    #[arg(long)]
    unsupported: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = BarometerConfig::default()
        .with_interval(cli.interval_ms)
        .and_then(|c| c.with_smoothing_factor(cli.smoothing))
        .and_then(|c| c.with_local_pressure(cli.local_pressure))
        .map(|c| c.with_ignore_sample_count(cli.ignore_samples))
        .context("invalid barometer configuration")?;

    let sensor = SimulatedPressureSensor::new(PressureProfile::hike(STANDARD_ATMOSPHERE_HPA), !cli.unsupported)
        .with_hardware_rate(cli.hardware_rate_hz)?;
    let mut barometer = Barometer::new(sensor, config);
    info!("Barometer supported: {}", barometer.is_supported());

    let (tx, rx) = mpsc::channel::<BarometerPayload>();
    let watch_id = barometer
        .watch(move |payload: &BarometerPayload| {
            // Receiver outlives the watch; a failed send only happens during shutdown
            let _ = tx.send(*payload);
        })
        .context("failed to start observing")?;

    let started = Instant::now();
    let deadline = started + Duration::from_secs(cli.duration_s);
    let pause_window = cli.pause_s.map(|pause_s| {
        let begin = started + Duration::from_secs(cli.duration_s / 2);
        (begin, begin + Duration::from_secs(pause_s))
    });
    let mut paused = false;
    let mut emitted = 0usize;

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }

        if let Some((begin, end)) = pause_window {
            if !paused && now >= begin && now < end {
                barometer.on_host_pause();
                paused = true;
            } else if paused && now >= end {
                barometer.on_host_resume();
                paused = false;
            }
        }

        match rx.recv_timeout(Duration::from_millis(100).min(deadline - now)) {
            Ok(payload) => {
                println!("{}", serde_json::to_string(&payload)?);
                emitted += 1;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    barometer.clear_watch(watch_id);
    barometer.on_host_destroy();
    info!("Emitted {} readings in {:.1} s", emitted, started.elapsed().as_secs_f64());
    Ok(())
}
