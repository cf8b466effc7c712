// Host application lifecycle hooks
use hal::PressureSensor;

use crate::module::BarometerModule;

/// Lifecycle notifications from the host application framework.
///
/// The processor itself has no notion of lifecycle; these map host events onto
/// sensor registration and start/stop.
pub trait HostLifecycle {
    /// The host returned to the foreground
    fn on_host_resume(&mut self);

    /// The host went to the background. Delivery stops but the request to
    /// observe is remembered.
    fn on_host_pause(&mut self);

    /// The host is being torn down
    fn on_host_destroy(&mut self);
}

impl<S: PressureSensor> HostLifecycle for BarometerModule<S> {
    fn on_host_resume(&mut self) {
        self.resume();
    }

    fn on_host_pause(&mut self) {
        self.pause();
    }

    fn on_host_destroy(&mut self) {
        self.stop_observing();
    }
}
