//! Common data types for host sensor interfaces

/// Standard atmosphere pressure at sea level in hectopascals
pub const STANDARD_ATMOSPHERE_HPA: f64 = 1013.25;

/// Milliseconds since the Unix epoch, as reported by the host
pub type TimestampMs = u64;
