// Watch/clear-watch surface for scripting consumers
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use altimeter::BarometerConfig;
use hal::PressureSensor;
use log::debug;

use crate::error::BridgeResult;
use crate::event::{BarometerEvent, BarometerPayload, EventSink};
use crate::lifecycle::HostLifecycle;
use crate::module::BarometerModule;

/// Handle returned by [`Barometer::watch`]
pub type WatchId = u64;

type WatchCallback = Box<dyn Fn(&BarometerPayload) + Send>;

#[derive(Default)]
struct Watchers {
    callbacks: Mutex<BTreeMap<WatchId, WatchCallback>>,
}

impl EventSink for Watchers {
    fn emit(&self, event: &BarometerEvent) -> BridgeResult<()> {
        let callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        for callback in callbacks.values() {
            callback(&event.payload);
        }
        Ok(())
    }
}

/// Barometer with any number of watchers.
///
/// The first watcher starts observing and removing the last one stops it.
pub struct Barometer<S: PressureSensor> {
    module: BarometerModule<S>,
    watchers: Arc<Watchers>,
    next_id: WatchId,
    updates_enabled: bool,
}

impl<S: PressureSensor> Barometer<S> {
    pub fn new(sensor: S, config: BarometerConfig) -> Self {
        let watchers = Arc::new(Watchers::default());
        let sink: Arc<dyn EventSink> = watchers.clone();
        Self {
            module: BarometerModule::new(sensor, config, sink),
            watchers,
            next_id: 0,
            updates_enabled: false,
        }
    }

    /// Start watching. `callback` is called with every update.
    pub fn watch<F>(&mut self, callback: F) -> BridgeResult<WatchId>
    where
        F: Fn(&BarometerPayload) + Send + 'static,
    {
        if !self.updates_enabled {
            self.module.start_observing()?;
            self.updates_enabled = true;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks().insert(id, Box::new(callback));
        debug!("Added barometer watcher {}", id);
        Ok(id)
    }

    /// Stop the given watcher. Unknown or already-cleared ids are ignored.
    pub fn clear_watch(&mut self, id: WatchId) {
        let remaining = {
            let mut callbacks = self.callbacks();
            if callbacks.remove(&id).is_none() {
                return;
            }
            callbacks.len()
        };
        debug!("Removed barometer watcher {}", id);
        if remaining == 0 {
            self.module.stop_observing();
            self.updates_enabled = false;
        }
    }

    /// Stop observing and drop every watcher
    pub fn stop_observing(&mut self) {
        self.module.stop_observing();
        self.callbacks().clear();
        self.updates_enabled = false;
    }

    pub fn is_supported(&self) -> bool {
        self.module.is_supported()
    }

    pub fn is_observing(&self) -> bool {
        self.updates_enabled
    }

    pub fn watcher_count(&self) -> usize {
        self.callbacks().len()
    }

    /// Set the interval between event samples, restarting updates if enabled
    pub fn set_interval(&mut self, interval_ms: u32) -> BridgeResult<bool> {
        let applied = self.module.set_interval(interval_ms);
        if !self.module.is_observing() {
            self.updates_enabled = false;
        }
        applied
    }

    /// Set the local air pressure in hPa
    pub fn set_local_pressure(&mut self, pressure_hpa: f64) -> BridgeResult<()> {
        self.module.set_local_pressure(pressure_hpa)
    }

    pub fn set_smoothing_factor(&mut self, smoothing_factor: f64) -> bool {
        self.module.set_smoothing_factor(smoothing_factor)
    }

    pub fn smoothing_factor(&self) -> f64 {
        self.module.smoothing_factor()
    }

    pub fn module(&self) -> &BarometerModule<S> {
        &self.module
    }

    fn callbacks(&self) -> std::sync::MutexGuard<'_, BTreeMap<WatchId, WatchCallback>> {
        self.watchers.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PressureSensor> HostLifecycle for Barometer<S> {
    fn on_host_resume(&mut self) {
        self.module.on_host_resume();
        if !self.module.is_observing() {
            self.updates_enabled = false;
        }
    }

    fn on_host_pause(&mut self) {
        self.module.on_host_pause();
    }

    fn on_host_destroy(&mut self) {
        self.stop_observing();
    }
}
