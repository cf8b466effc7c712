// Hand-driven sensor for unit tests
use std::sync::{Arc, Mutex};

use hal::{PressureSample, PressureSensor, SampleCallback, SensorStatus};

#[derive(Default)]
struct FakeState {
    available: bool,
    refuse_registration: bool,
    callback: Option<SampleCallback>,
    interval_ms: u32,
    registrations: u32,
    last_sample_ms: Option<u64>,
}

/// Clones share state, so a test keeps one handle while the module owns another.
#[derive(Clone, Default)]
pub(crate) struct FakeSensor {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSensor {
    pub(crate) fn available() -> Self {
        let sensor = Self::default();
        sensor.state.lock().unwrap().available = true;
        sensor
    }

    pub(crate) fn missing() -> Self {
        Self::default()
    }

    pub(crate) fn refuse_registration(&self, refuse: bool) {
        self.state.lock().unwrap().refuse_registration = refuse;
    }

    pub(crate) fn is_registered(&self) -> bool {
        self.state.lock().unwrap().callback.is_some()
    }

    pub(crate) fn registrations(&self) -> u32 {
        self.state.lock().unwrap().registrations
    }

    /// Deliver a sample the way the host would. Dropped when not registered.
    pub(crate) fn deliver(&self, pressure_hpa: f64, timestamp_ms: u64) {
        let mut state = self.state.lock().unwrap();
        state.last_sample_ms = Some(timestamp_ms);
        if let Some(callback) = state.callback.as_mut() {
            callback(PressureSample::new(pressure_hpa, timestamp_ms));
        }
    }
}

impl PressureSensor for FakeSensor {
    fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn register_for_samples(&mut self, interval_ms: u32, callback: SampleCallback) -> bool {
        let mut state = self.state.lock().unwrap();
        if !state.available || state.refuse_registration {
            return false;
        }
        state.callback = Some(callback);
        state.interval_ms = interval_ms;
        state.registrations += 1;
        true
    }

    fn unregister_samples(&mut self) {
        self.state.lock().unwrap().callback = None;
    }

    fn status(&self) -> SensorStatus {
        let state = self.state.lock().unwrap();
        SensorStatus {
            available: state.available,
            registered: state.callback.is_some(),
            interval_ms: state.interval_ms,
            last_sample_ms: state.last_sample_ms,
        }
    }
}
