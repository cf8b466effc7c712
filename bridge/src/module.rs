// Host module around one pressure sensor
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use altimeter::{BarometerConfig, BarometerProcessor};
use hal::{PressureSample, PressureSensor, SampleCallback, SensorStatus};
use log::{debug, error, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::event::{BarometerEvent, EventSink};

/// Host module exposing one pressure sensor.
///
/// The processor lives behind a mutex because samples arrive on the sensor's
/// delivery thread while configuration calls come from the host.
pub struct BarometerModule<S: PressureSensor> {
    sensor: S,
    processor: Arc<Mutex<BarometerProcessor>>,
    sink: Arc<dyn EventSink>,
    observing: bool,
    paused: bool,
}

impl<S: PressureSensor> BarometerModule<S> {
    pub fn new(sensor: S, config: BarometerConfig, sink: Arc<dyn EventSink>) -> Self {
        let processor = BarometerProcessor::new(config, sensor.is_available());
        Self {
            sensor,
            processor: Arc::new(Mutex::new(processor)),
            sink,
            observing: false,
            paused: false,
        }
    }

    /// Whether this device is capable of providing barometric updates
    pub fn is_supported(&self) -> bool {
        self.lock_processor().is_supported()
    }

    /// Whether updates were requested, even if the host has paused delivery
    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn sensor_status(&self) -> SensorStatus {
        self.sensor.status()
    }

    /// Copy of the processor state, for inspection
    pub fn snapshot(&self) -> BarometerProcessor {
        self.lock_processor().clone()
    }

    pub fn interval_ms(&self) -> u32 {
        self.lock_processor().interval_ms()
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.lock_processor().smoothing_factor()
    }

    /// Set the interval between event samples.
    ///
    /// While observing, delivery is stopped and restarted at the new cadence and
    /// calibration begins again. A zero interval is ignored and returns `Ok(false)`.
    pub fn set_interval(&mut self, interval_ms: u32) -> BridgeResult<bool> {
        if !BarometerConfig::interval_is_valid(interval_ms) {
            warn!("Ignoring invalid sampling interval {} ms", interval_ms);
            return Ok(false);
        }

        let delivering = self.is_delivering();
        if delivering {
            self.sensor.unregister_samples();
        }
        self.lock_processor().set_interval(interval_ms);
        if delivering {
            self.register(interval_ms)?;
        }
        Ok(true)
    }

    /// Set the local pressure in hectopascals
    pub fn set_local_pressure(&mut self, pressure_hpa: f64) -> BridgeResult<()> {
        self.lock_processor().set_local_pressure(pressure_hpa)?;
        Ok(())
    }

    /// Returns whether the factor was within [0, 1] and applied
    pub fn set_smoothing_factor(&mut self, smoothing_factor: f64) -> bool {
        self.lock_processor().set_smoothing_factor(smoothing_factor)
    }

    /// Start observing pressure. Resolves to the effective interval.
    pub fn start_observing(&mut self) -> BridgeResult<u32> {
        if self.is_delivering() {
            self.sensor.unregister_samples();
        }
        let interval_ms = self.lock_processor().start()?;
        self.observing = true;
        self.paused = false;
        self.register(interval_ms)?;
        Ok(interval_ms)
    }

    /// Stop observing pressure and reset all derived state
    pub fn stop_observing(&mut self) {
        self.sensor.unregister_samples();
        self.lock_processor().stop();
        self.observing = false;
        self.paused = false;
    }

    pub(crate) fn pause(&mut self) {
        if self.is_delivering() {
            self.sensor.unregister_samples();
            self.paused = true;
            info!("Barometer delivery paused by host");
        }
    }

    pub(crate) fn resume(&mut self) {
        if !(self.observing && self.paused) {
            return;
        }
        self.paused = false;
        let interval_ms = self.interval_ms();
        match self.register(interval_ms) {
            Ok(()) => info!("Barometer delivery resumed"),
            Err(err) => error!("Failed to resume barometer updates: {}", err),
        }
    }

    fn is_delivering(&self) -> bool {
        self.observing && !self.paused
    }

    fn register(&mut self, interval_ms: u32) -> BridgeResult<()> {
        let callback = sample_callback(Arc::clone(&self.processor), Arc::clone(&self.sink));
        if self.sensor.register_for_samples(interval_ms, callback) {
            debug!("Registered for pressure samples at {} ms", interval_ms);
            return Ok(());
        }

        warn!("Host refused pressure sample registration");
        self.lock_processor().stop();
        self.observing = false;
        Err(BridgeError::RegistrationFailed { interval_ms })
    }

    fn lock_processor(&self) -> MutexGuard<'_, BarometerProcessor> {
        lock(&self.processor)
    }
}

fn lock(processor: &Mutex<BarometerProcessor>) -> MutexGuard<'_, BarometerProcessor> {
    // Poisoning is irrelevant for plain data
    processor.lock().unwrap_or_else(PoisonError::into_inner)
}

fn sample_callback(
    processor: Arc<Mutex<BarometerProcessor>>,
    sink: Arc<dyn EventSink>,
) -> SampleCallback {
    Box::new(move |sample: PressureSample| {
        let reading = lock(&processor).ingest(sample.pressure_hpa, sample.timestamp_ms);
        if let Some(reading) = reading {
            if let Err(err) = sink.emit(&BarometerEvent::update(reading)) {
                error!("Error sending barometer event: {}", err);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_sensor::FakeSensor;
    use altimeter::{barometric_altitude, AltimeterError};
    use approx::assert_relative_eq;
    use hal::STANDARD_ATMOSPHERE_HPA;
    use std::sync::mpsc;

    fn quick_config() -> BarometerConfig {
        BarometerConfig::default()
            .with_smoothing_factor(0.0)
            .unwrap()
            .with_ignore_sample_count(0)
    }

    fn module(
        sensor: &FakeSensor,
        config: BarometerConfig,
    ) -> (BarometerModule<FakeSensor>, mpsc::Receiver<BarometerEvent>) {
        let (tx, rx) = mpsc::channel();
        (BarometerModule::new(sensor.clone(), config, Arc::new(tx)), rx)
    }

    #[test]
    fn test_start_registers_and_emits() {
        let sensor = FakeSensor::available();
        let (mut module, rx) = module(&sensor, quick_config());

        assert!(module.is_supported());
        assert_eq!(module.start_observing().unwrap(), 200);
        assert!(sensor.is_registered());
        assert_eq!(module.sensor_status().interval_ms, 200);

        sensor.deliver(1013.25, 0);
        sensor.deliver(1005.0, 100); // throttled
        sensor.deliver(1000.0, 200);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload.altitude_asl, 0.0);

        let expected = barometric_altitude(STANDARD_ATMOSPHERE_HPA, 1000.0);
        assert_eq!(events[1].payload.timestamp, 200);
        assert_relative_eq!(events[1].payload.relative_altitude, expected);
        assert_relative_eq!(events[1].payload.vertical_speed, expected * 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_start_without_sensor() {
        let sensor = FakeSensor::missing();
        let (mut module, _rx) = module(&sensor, quick_config());

        assert!(!module.is_supported());
        match module.start_observing() {
            Err(BridgeError::Altimeter(AltimeterError::SensorUnavailable)) => {}
            other => panic!("Expected SensorUnavailable, got {:?}", other),
        }
        assert!(!module.is_observing());
        assert!(!module.snapshot().is_running());
        assert_eq!(sensor.registrations(), 0);
    }

    #[test]
    fn test_refused_registration_stops_processor() {
        let sensor = FakeSensor::available();
        sensor.refuse_registration(true);
        let (mut module, _rx) = module(&sensor, quick_config());

        assert!(matches!(
            module.start_observing(),
            Err(BridgeError::RegistrationFailed { interval_ms: 200 })
        ));
        assert!(!module.is_observing());
        assert!(!module.snapshot().is_running());
    }

    #[test]
    fn test_stop_unregisters_and_resets() {
        let sensor = FakeSensor::available();
        let (mut module, rx) = module(&sensor, quick_config());
        module.start_observing().unwrap();
        sensor.deliver(1000.0, 0);
        sensor.deliver(999.0, 200);

        module.stop_observing();
        assert!(!sensor.is_registered());
        assert!(!module.is_observing());
        let snapshot = module.snapshot();
        assert_eq!(snapshot.relative_altitude(), 0.0);
        assert_eq!(snapshot.baseline_altitude(), None);

        sensor.deliver(990.0, 400);
        assert_eq!(rx.try_iter().count(), 2, "no events after stop");

        // Idempotent
        module.stop_observing();
    }

    #[test]
    fn test_set_interval_while_observing_reregisters() {
        let sensor = FakeSensor::available();
        let (mut module, rx) = module(&sensor, quick_config());
        module.start_observing().unwrap();
        sensor.deliver(1000.0, 0);

        assert!(module.set_interval(1_000).unwrap());
        assert_eq!(sensor.registrations(), 2);
        assert_eq!(module.sensor_status().interval_ms, 1_000);
        assert_eq!(module.snapshot().baseline_altitude(), None);

        sensor.deliver(1000.0, 500);
        sensor.deliver(1000.0, 1_000);
        sensor.deliver(1000.0, 1_999);
        sensor.deliver(1000.0, 2_000);
        assert_eq!(rx.try_iter().count(), 3);
    }

    #[test]
    fn test_set_interval_while_idle() {
        let sensor = FakeSensor::available();
        let (mut module, _rx) = module(&sensor, quick_config());

        assert!(module.set_interval(500).unwrap());
        assert_eq!(sensor.registrations(), 0);
        assert!(!module.set_interval(0).unwrap());
        assert_eq!(module.interval_ms(), 500);
        assert_eq!(module.start_observing().unwrap(), 500);
    }

    #[test]
    fn test_configuration_passthrough() {
        let sensor = FakeSensor::available();
        let (mut module, _rx) = module(&sensor, BarometerConfig::default());

        assert!(!module.set_smoothing_factor(1.5));
        assert_eq!(module.smoothing_factor(), 0.7);
        assert!(module.set_smoothing_factor(0.5));
        assert_eq!(module.smoothing_factor(), 0.5);

        assert!(module.set_local_pressure(-1.0).is_err());
        module.set_local_pressure(1020.0).unwrap();
        assert_eq!(module.snapshot().local_pressure_hpa(), 1020.0);
    }

    #[test]
    fn test_closed_sink_does_not_stop_sampling() {
        let sensor = FakeSensor::available();
        let (mut module, rx) = module(&sensor, quick_config());
        module.start_observing().unwrap();
        drop(rx);

        sensor.deliver(1000.0, 0);
        sensor.deliver(999.0, 200);
        let snapshot = module.snapshot();
        assert_eq!(snapshot.last_sample_time_ms(), 200);
        assert!(module.is_observing());
    }
}
