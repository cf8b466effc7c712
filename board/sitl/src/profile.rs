use altimeter::pressure_at_altitude;
use anyhow::ensure;

/// Synthetic altitude trace, turned into pressure readings
#[derive(Debug, Clone)]
pub struct PressureProfile {
    sea_level_hpa: f64,
    /// (seconds since start, altitude in meters), sorted by time
    waypoints: Vec<(f64, f64)>,
    noise_hpa: f64,
}

impl PressureProfile {
    pub fn new(sea_level_hpa: f64, waypoints: Vec<(f64, f64)>, noise_hpa: f64) -> anyhow::Result<Self> {
        ensure!(sea_level_hpa > 0.0, "sea level pressure must be positive");
        ensure!(!waypoints.is_empty(), "profile needs at least one waypoint");
        ensure!(
            waypoints.windows(2).all(|w| w[0].0 < w[1].0),
            "waypoint times must be strictly increasing"
        );
        Ok(Self {
            sea_level_hpa,
            waypoints,
            noise_hpa,
        })
    }

    /// Standing at 120 m, a 60 m climb, a pause at the top and the walk back down
    pub fn hike(sea_level_hpa: f64) -> Self {
        Self {
            sea_level_hpa,
            waypoints: vec![(0.0, 120.0), (5.0, 120.0), (25.0, 180.0), (30.0, 180.0), (45.0, 120.0)],
            noise_hpa: 0.05,
        }
    }

    pub fn altitude_at(&self, t: f64) -> f64 {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for w in self.waypoints.windows(2) {
            let ((t0, a0), (t1, a1)) = (w[0], w[1]);
            if t <= t1 {
                return a0 + (a1 - a0) * (t - t0) / (t1 - t0);
            }
        }
        last.1
    }

    /// Pressure in hPa at `t` seconds, including sensor noise
    pub fn pressure_at(&self, t: f64) -> f64 {
        pressure_at_altitude(self.sea_level_hpa, self.altitude_at(t)) + self.noise(t)
    }

    // Deterministic jitter so runs are reproducible
    fn noise(&self, t: f64) -> f64 {
        self.noise_hpa * (t * 7.3).sin() * (t * 1.7).cos()
    }
}
