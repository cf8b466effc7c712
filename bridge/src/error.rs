use altimeter::AltimeterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Altimeter(#[from] AltimeterError),

    #[error("Host refused pressure sample registration at {interval_ms} ms")]
    RegistrationFailed { interval_ms: u32 },

    #[error("Event sink is closed")]
    SinkClosed,

    #[error("Payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
