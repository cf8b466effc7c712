use thiserror::Error;

/// Errors reported by the barometer processor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AltimeterError {
    /// The device has no pressure sensor. This is a property of the device and
    /// will not change within a session.
    #[error("Pressure sensor not available; will not provide altitude data")]
    SensorUnavailable,

    /// A configuration value was rejected
    #[error("Invalid configuration for {parameter}: {message}")]
    InvalidConfig {
        /// Detailed error message
        message: String,
        /// Configuration parameter that caused the error
        parameter: &'static str,
    },
}

impl AltimeterError {
    pub(crate) fn invalid_config(parameter: &'static str, message: impl Into<String>) -> Self {
        AltimeterError::InvalidConfig {
            message: message.into(),
            parameter,
        }
    }
}

/// Result type for altimeter operations
pub type AltimeterResult<T> = Result<T, AltimeterError>;
