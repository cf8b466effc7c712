// Barometer signal processing
use hal::{TimestampMs, STANDARD_ATMOSPHERE_HPA};
use log::{debug, info, warn};

use crate::atmosphere::barometric_altitude;
use crate::config::BarometerConfig;
use crate::error::{AltimeterError, AltimeterResult};

/// One derived reading, produced per accepted sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedReading {
    /// Timestamp of the raw sample that produced this reading
    pub timestamp_ms: TimestampMs,

    /// Smoothed pressure in hPa
    pub pressure_hpa: f64,

    /// Altitude in meters against the standard atmosphere
    pub altitude_asl: f64,

    /// Altitude in meters against the configured local pressure
    pub local_altitude: f64,

    /// Altitude change in meters since the calibrated baseline, 0 until latched
    pub relative_altitude: f64,

    /// Vertical speed in meters per second
    pub vertical_speed_mps: f64,
}

/// Stateful filter turning raw pressure samples into [`DerivedReading`]s.
///
/// Samples are throttled to the configured interval, smoothed with an
/// exponential moving average and converted to altitude. After a warm-up of
/// `ignore_sample_count` accepted samples the current altitude is latched as the
/// baseline for the relative altitude.
#[derive(Debug, Clone, PartialEq)]
pub struct BarometerProcessor {
    config: BarometerConfig,
    sensor_available: bool,

    running: bool,
    smoothed_pressure_hpa: f64,
    last_sample_time_ms: Option<TimestampMs>,
    altitude_asl: f64,
    baseline_altitude: Option<f64>,
    ignored_count: u32,
    relative_altitude: f64,
}

impl BarometerProcessor {
    /// Create an idle processor.
    ///
    /// `sensor_available` is the host's answer to whether a pressure sensor exists.
    pub fn new(config: BarometerConfig, sensor_available: bool) -> Self {
        Self {
            config,
            sensor_available,
            running: false,
            smoothed_pressure_hpa: 0.0,
            last_sample_time_ms: None,
            altitude_asl: 0.0,
            baseline_altitude: None,
            ignored_count: 0,
            relative_altitude: 0.0,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.sensor_available
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &BarometerConfig {
        &self.config
    }

    pub fn interval_ms(&self) -> u32 {
        self.config.interval_ms
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.config.smoothing_factor
    }

    pub fn local_pressure_hpa(&self) -> f64 {
        self.config.local_pressure_hpa
    }

    pub fn ignore_sample_count(&self) -> u32 {
        self.config.ignore_sample_count
    }

    pub fn smoothed_pressure_hpa(&self) -> f64 {
        self.smoothed_pressure_hpa
    }

    /// Time of the last accepted sample, 0 when idle
    pub fn last_sample_time_ms(&self) -> TimestampMs {
        self.last_sample_time_ms.unwrap_or(0)
    }

    pub fn altitude_asl(&self) -> f64 {
        self.altitude_asl
    }

    pub fn baseline_altitude(&self) -> Option<f64> {
        self.baseline_altitude
    }

    pub fn ignored_count(&self) -> u32 {
        self.ignored_count
    }

    pub fn relative_altitude(&self) -> f64 {
        self.relative_altitude
    }

    /// Start processing. Returns the effective sampling interval.
    ///
    /// Fails with [`AltimeterError::SensorUnavailable`] without touching any
    /// state when the device has no pressure sensor.
    pub fn start(&mut self) -> AltimeterResult<u32> {
        if !self.sensor_available {
            warn!("Start requested but no pressure sensor is available");
            return Err(AltimeterError::SensorUnavailable);
        }
        self.restart();
        info!("Barometer started at {} ms interval", self.config.interval_ms);
        Ok(self.config.interval_ms)
    }

    /// Stop processing and return to idle defaults. Safe to call at any time.
    pub fn stop(&mut self) {
        if self.running {
            info!("Barometer stopped");
        }
        self.reset_state();
        self.running = false;
    }

    /// Update the sampling interval.
    ///
    /// While running, throttling and calibration restart from scratch so the
    /// warm-up never spans samples taken at different cadences. Returns false
    /// and leaves the configuration unchanged for a zero interval.
    pub fn set_interval(&mut self, interval_ms: u32) -> bool {
        if !BarometerConfig::interval_is_valid(interval_ms) {
            warn!("Ignoring invalid sampling interval {} ms", interval_ms);
            return false;
        }
        self.config.interval_ms = interval_ms;
        if self.running {
            self.stop();
            self.restart();
            info!("Barometer restarted at {} ms interval", interval_ms);
        }
        true
    }

    /// Set the local reference pressure. Takes effect on the next accepted sample.
    pub fn set_local_pressure(&mut self, local_pressure_hpa: f64) -> AltimeterResult<()> {
        self.config = self.config.with_local_pressure(local_pressure_hpa)?;
        Ok(())
    }

    /// Set the smoothing factor. Values outside [0, 1] are ignored and the
    /// previous factor is kept. Returns whether the value was applied.
    pub fn set_smoothing_factor(&mut self, smoothing_factor: f64) -> bool {
        match self.config.with_smoothing_factor(smoothing_factor) {
            Ok(config) => {
                self.config = config;
                true
            }
            Err(err) => {
                warn!("{}", err);
                false
            }
        }
    }

    /// Set the warm-up length. Takes effect the next time the processor starts.
    pub fn set_ignore_sample_count(&mut self, ignore_sample_count: u32) {
        self.config.ignore_sample_count = ignore_sample_count;
    }

    /// Feed one raw sample.
    ///
    /// Returns `None` when the sample is throttled, out of order, not a valid
    /// pressure, or arrives while the processor is idle. Rejected samples leave
    /// the state untouched.
    pub fn ingest(&mut self, raw_pressure_hpa: f64, now_ms: TimestampMs) -> Option<DerivedReading> {
        if !self.running {
            return None;
        }
        if !raw_pressure_hpa.is_finite() || raw_pressure_hpa < 0.0 {
            warn!("Dropping invalid pressure sample {} hPa", raw_pressure_hpa);
            return None;
        }

        let elapsed_ms = match self.last_sample_time_ms {
            Some(last) if now_ms < last => {
                debug!("Dropping out-of-order sample at {} (last {})", now_ms, last);
                return None;
            }
            Some(last) => {
                let elapsed = now_ms - last;
                if elapsed < u64::from(self.config.interval_ms) {
                    return None;
                }
                elapsed
            }
            // Idle time base is zero
            None => now_ms,
        };

        let factor = self.config.smoothing_factor;
        self.smoothed_pressure_hpa =
            raw_pressure_hpa * (1.0 - factor) + self.smoothed_pressure_hpa * factor;

        let previous_altitude = self.altitude_asl;
        self.altitude_asl = barometric_altitude(STANDARD_ATMOSPHERE_HPA, self.smoothed_pressure_hpa);

        let vertical_speed_mps = if elapsed_ms == 0 {
            0.0
        } else {
            (self.altitude_asl - previous_altitude) / elapsed_ms as f64 * 1000.0
        };

        let local_altitude =
            barometric_altitude(self.config.local_pressure_hpa, self.smoothed_pressure_hpa);

        match self.baseline_altitude {
            Some(baseline) => self.relative_altitude = self.altitude_asl - baseline,
            None if self.ignored_count < self.config.ignore_sample_count => {
                self.ignored_count += 1;
            }
            None => {
                debug!(
                    "Baseline altitude latched at {:.2} m after {} warm-up samples",
                    self.altitude_asl, self.ignored_count
                );
                self.baseline_altitude = Some(self.altitude_asl);
            }
        }

        self.last_sample_time_ms = Some(now_ms);

        Some(DerivedReading {
            timestamp_ms: now_ms,
            pressure_hpa: self.smoothed_pressure_hpa,
            altitude_asl: self.altitude_asl,
            local_altitude,
            relative_altitude: self.relative_altitude,
            vertical_speed_mps,
        })
    }

    fn restart(&mut self) {
        self.reset_state();
        self.running = true;
    }

    fn reset_state(&mut self) {
        self.smoothed_pressure_hpa = 0.0;
        self.last_sample_time_ms = None;
        self.altitude_asl = 0.0;
        self.baseline_altitude = None;
        self.ignored_count = 0;
        self.relative_altitude = 0.0;
    }
}
