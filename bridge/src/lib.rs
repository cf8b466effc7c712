//! Host-facing barometer module.
//!
//! Pairs a host [`hal::PressureSensor`] with an [`altimeter::BarometerProcessor`],
//! forwards every derived reading to an [`EventSink`] as a `barometerUpdate`
//! event, and offers the watch/clear-watch surface scripting layers expect.

mod error;
mod event;
mod lifecycle;
mod module;
mod watch;

#[cfg(test)]
mod fake_sensor;

pub use error::{BridgeError, BridgeResult};
pub use event::{BarometerEvent, BarometerPayload, EventSink, BAROMETER_UPDATE_EVENT};
pub use lifecycle::HostLifecycle;
pub use module::BarometerModule;
pub use watch::{Barometer, WatchId};
