//! # Altimeter - barometric altitude from raw pressure samples
//!
//! Converts a stream of raw pressure readings into smoothed pressure, absolute
//! altitude, altitude against a local reference pressure, altitude relative to a
//! calibrated baseline, and vertical speed.
//!
//! The processor is a plain state machine. It never talks to the sensor itself;
//! whoever owns the sensor feeds it samples through [`BarometerProcessor::ingest`]
//! and forwards the returned [`DerivedReading`] values.

mod atmosphere;
mod config;
mod error;
mod processor;

pub use atmosphere::{barometric_altitude, pressure_at_altitude, ALTITUDE_EXPONENT};
pub use config::BarometerConfig;
pub use error::{AltimeterError, AltimeterResult};
pub use processor::{BarometerProcessor, DerivedReading};
