use hal::STANDARD_ATMOSPHERE_HPA;

use crate::error::{AltimeterError, AltimeterResult};

/// Configuration for the barometer processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarometerConfig {
    /// Minimum time between accepted samples in milliseconds. Always > 0.
    pub interval_ms: u32,

    /// Weight given to the previous smoothed pressure, in [0, 1].
    /// 0 passes raw pressure through, 1 freezes the output.
    pub smoothing_factor: f64,

    /// Sea-level-equivalent reference pressure for the local altitude, in hPa
    pub local_pressure_hpa: f64,

    /// Accepted samples discarded before the relative altitude baseline is latched
    pub ignore_sample_count: u32,
}

impl Default for BarometerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            smoothing_factor: 0.7,
            local_pressure_hpa: STANDARD_ATMOSPHERE_HPA,
            ignore_sample_count: 10,
        }
    }
}

impl BarometerConfig {
    pub fn with_interval(mut self, interval_ms: u32) -> AltimeterResult<Self> {
        if !Self::interval_is_valid(interval_ms) {
            return Err(AltimeterError::invalid_config(
                "interval_ms",
                "interval must be positive",
            ));
        }
        self.interval_ms = interval_ms;
        Ok(self)
    }

    pub fn with_smoothing_factor(mut self, smoothing_factor: f64) -> AltimeterResult<Self> {
        if !Self::smoothing_factor_is_valid(smoothing_factor) {
            return Err(AltimeterError::invalid_config(
                "smoothing_factor",
                format!("{smoothing_factor} is outside [0, 1]"),
            ));
        }
        self.smoothing_factor = smoothing_factor;
        Ok(self)
    }

    pub fn with_local_pressure(mut self, local_pressure_hpa: f64) -> AltimeterResult<Self> {
        if !Self::local_pressure_is_valid(local_pressure_hpa) {
            return Err(AltimeterError::invalid_config(
                "local_pressure_hpa",
                format!("{local_pressure_hpa} hPa must be positive and finite"),
            ));
        }
        self.local_pressure_hpa = local_pressure_hpa;
        Ok(self)
    }

    pub fn with_ignore_sample_count(mut self, ignore_sample_count: u32) -> Self {
        self.ignore_sample_count = ignore_sample_count;
        self
    }

    pub fn interval_is_valid(interval_ms: u32) -> bool {
        interval_ms > 0
    }

    // NaN fails both comparisons
    pub fn smoothing_factor_is_valid(smoothing_factor: f64) -> bool {
        (0.0..=1.0).contains(&smoothing_factor)
    }

    pub fn local_pressure_is_valid(local_pressure_hpa: f64) -> bool {
        local_pressure_hpa.is_finite() && local_pressure_hpa > 0.0
    }
}
