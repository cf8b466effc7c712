// Events forwarded to the scripting layer
use std::sync::mpsc::Sender;

use altimeter::DerivedReading;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};

/// Name of the event emitted once per derived reading
pub const BAROMETER_UPDATE_EVENT: &str = "barometerUpdate";

/// Wire shape of a derived reading as seen by scripting consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarometerPayload {
    /// Sample time in epoch milliseconds
    pub timestamp: u64,
    /// Smoothed pressure in hPa
    pub pressure: f64,
    /// Standard atmosphere altitude in meters
    #[serde(rename = "altitudeASL")]
    pub altitude_asl: f64,
    /// Altitude against the local reference pressure in meters
    pub altitude: f64,
    pub relative_altitude: f64,
    /// Meters per second, positive when climbing
    pub vertical_speed: f64,
}

impl From<DerivedReading> for BarometerPayload {
    fn from(reading: DerivedReading) -> Self {
        Self {
            timestamp: reading.timestamp_ms,
            pressure: reading.pressure_hpa,
            altitude_asl: reading.altitude_asl,
            altitude: reading.local_altitude,
            relative_altitude: reading.relative_altitude,
            vertical_speed: reading.vertical_speed_mps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarometerEvent {
    pub name: &'static str,
    pub payload: BarometerPayload,
}

impl BarometerEvent {
    pub fn update(reading: DerivedReading) -> Self {
        Self {
            name: BAROMETER_UPDATE_EVENT,
            payload: reading.into(),
        }
    }

    /// Serialize the payload alone, as handed to an event emitter
    pub fn payload_json(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string(&self.payload)?)
    }
}

/// Receiver of emitted events.
///
/// Called on the sensor's delivery thread. A failing sink never stops sampling;
/// the error is logged and the next reading is delivered as usual.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BarometerEvent) -> BridgeResult<()>;
}

impl<F> EventSink for F
where
    F: Fn(&BarometerEvent) + Send + Sync,
{
    fn emit(&self, event: &BarometerEvent) -> BridgeResult<()> {
        self(event);
        Ok(())
    }
}

impl EventSink for Sender<BarometerEvent> {
    fn emit(&self, event: &BarometerEvent) -> BridgeResult<()> {
        self.send(*event).map_err(|_| BridgeError::SinkClosed)
    }
}
