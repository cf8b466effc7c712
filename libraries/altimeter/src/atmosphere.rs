// International barometric formula

/// Exponent of the international barometric formula, `1 / 5.255`
pub const ALTITUDE_EXPONENT: f64 = 1.0 / 5.255;

const ALTITUDE_SCALE_M: f64 = 44330.0;

/// Altitude in meters of pressure `p` relative to reference pressure `p0`.
///
/// Both pressures must be in the same unit. Returns 0 when `p == p0`.
pub fn barometric_altitude(p0: f64, p: f64) -> f64 {
    ALTITUDE_SCALE_M * (1.0 - (p / p0).powf(ALTITUDE_EXPONENT))
}

/// Inverse of [`barometric_altitude`]: the pressure observed at `altitude_m`
/// when the reference pressure is `p0`.
pub fn pressure_at_altitude(p0: f64, altitude_m: f64) -> f64 {
    p0 * (1.0 - altitude_m / ALTITUDE_SCALE_M).powf(1.0 / ALTITUDE_EXPONENT)
}
