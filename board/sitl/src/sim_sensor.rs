use std::{
    sync::{mpsc, Arc, RwLock},
    thread::JoinHandle,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::ensure;
use hal::{PressureSample, PressureSensor, SampleCallback, SensorStatus};
use log::{debug, error};

use crate::profile::PressureProfile;

pub enum SensorCommand {
    Stop,
}

struct Worker {
    to_worker_tx: mpsc::Sender<SensorCommand>,
    handle: JoinHandle<()>,
}

/// Pressure sensor backed by a [`PressureProfile`], sampled on a worker thread.
///
/// Like real hardware it delivers at its own rate regardless of the interval
/// requested at registration.
pub struct SimulatedPressureSensor {
    profile: Arc<PressureProfile>,
    available: bool,
    hardware_period: Duration,
    interval_ms: u32,
    last_sample_ms: Arc<RwLock<Option<u64>>>,
    worker: Option<Worker>,
}

impl SimulatedPressureSensor {
    pub fn new(profile: PressureProfile, available: bool) -> Self {
        Self {
            profile: Arc::new(profile),
            available,
            hardware_period: Duration::from_millis(1000 / 50), // 50 Hz
            interval_ms: 0,
            last_sample_ms: Arc::new(RwLock::new(None)),
            worker: None,
        }
    }

    pub fn with_hardware_rate(mut self, rate_hz: u32) -> anyhow::Result<Self> {
        ensure!(rate_hz > 0, "hardware rate must be positive");
        self.hardware_period = Duration::from_secs_f64(1.0 / f64::from(rate_hz));
        Ok(self)
    }

    fn run(
        profile: Arc<PressureProfile>,
        period: Duration,
        last_sample_ms: Arc<RwLock<Option<u64>>>,
        mut callback: SampleCallback,
        to_worker_rx: mpsc::Receiver<SensorCommand>,
    ) -> JoinHandle<()> {
        std::thread::spawn(move || {
            let started = Instant::now();
            loop {
                match to_worker_rx.try_recv() {
                    Ok(SensorCommand::Stop) | Err(mpsc::TryRecvError::Disconnected) => return,
                    Err(mpsc::TryRecvError::Empty) => {}
                }

                let t = started.elapsed().as_secs_f64();
                let timestamp_ms = epoch_millis();
                callback(PressureSample::new(profile.pressure_at(t), timestamp_ms));
                if let Ok(mut last) = last_sample_ms.write() {
                    *last = Some(timestamp_ms);
                }

                std::thread::sleep(period);
            }
        })
    }
}

impl PressureSensor for SimulatedPressureSensor {
    fn is_available(&self) -> bool {
        self.available
    }

    fn register_for_samples(&mut self, interval_ms: u32, callback: SampleCallback) -> bool {
        if !self.available {
            return false;
        }
        self.unregister_samples();

        let (to_worker_tx, to_worker_rx) = mpsc::channel();
        let handle = Self::run(
            Arc::clone(&self.profile),
            self.hardware_period,
            Arc::clone(&self.last_sample_ms),
            callback,
            to_worker_rx,
        );
        self.worker = Some(Worker {
            to_worker_tx,
            handle,
        });
        self.interval_ms = interval_ms;
        debug!("Simulated sensor delivering every {:?}", self.hardware_period);
        true
    }

    fn unregister_samples(&mut self) {
        if let Some(worker) = self.worker.take() {
            // A send error means the worker already exited
            let _ = worker.to_worker_tx.send(SensorCommand::Stop);
            if worker.handle.join().is_err() {
                error!("Simulated sensor worker panicked");
            }
        }
    }

    fn status(&self) -> SensorStatus {
        SensorStatus {
            available: self.available,
            registered: self.worker.is_some(),
            interval_ms: self.interval_ms,
            last_sample_ms: self.last_sample_ms.read().ok().and_then(|last| *last),
        }
    }
}

impl Drop for SimulatedPressureSensor {
    fn drop(&mut self) {
        self.unregister_samples();
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
