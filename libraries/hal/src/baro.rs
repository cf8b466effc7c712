//! Pressure sensor interface provided by the host
use alloc::boxed::Box;

use crate::types::TimestampMs;

/// One raw reading delivered by the host sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSample {
    /// Raw pressure in hectopascals
    pub pressure_hpa: f64,

    /// Time the sample was taken
    pub timestamp_ms: TimestampMs,
}

impl PressureSample {
    pub fn new(pressure_hpa: f64, timestamp_ms: TimestampMs) -> Self {
        Self {
            pressure_hpa,
            timestamp_ms,
        }
    }
}

/// Callback the host invokes once per raw hardware sample
pub type SampleCallback = Box<dyn FnMut(PressureSample) + Send>;

/// Pressure sensor interface
///
/// Samples may arrive on whatever thread the host uses for sensor events, and at
/// a cadence that only loosely follows the requested interval.
pub trait PressureSensor: Send {
    /// Whether the device has a pressure sensor at all
    fn is_available(&self) -> bool;

    /// Begin delivering samples to `callback`
    ///
    /// `interval_ms` is a hint; the host may deliver faster or slower.
    /// Returns false if the host refused the registration.
    fn register_for_samples(&mut self, interval_ms: u32, callback: SampleCallback) -> bool;

    /// Stop delivering samples. Calling this while not registered is a no-op.
    fn unregister_samples(&mut self);

    /// Get the status of the sensor
    fn status(&self) -> SensorStatus;
}

/// Pressure sensor status information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorStatus {
    /// Whether the sensor capability exists on this device
    pub available: bool,

    /// Whether a sample callback is currently registered
    pub registered: bool,

    /// The interval requested at registration, in milliseconds
    pub interval_ms: u32,

    /// Timestamp of the last delivered sample
    pub last_sample_ms: Option<TimestampMs>,
}
