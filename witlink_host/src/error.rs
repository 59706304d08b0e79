/// Failures reported by a `Transport` implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Service discovery failed: {0}")]
    Discover(String),

    #[error("Subscribe to {characteristic} failed: {reason}")]
    Subscribe {
        characteristic: String,
        reason: String,
    },

    #[error("Unsubscribe from {characteristic} failed: {reason}")]
    Unsubscribe {
        characteristic: String,
        reason: String,
    },

    #[error("Write to {characteristic} failed: {reason}")]
    Write {
        characteristic: String,
        reason: String,
    },

    #[error("Device is not connected")]
    Disconnected,
}

/// Errors surfaced to users of a `Session`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Could not connect: {0}")]
    Connect(#[source] TransportError),

    #[error("Service {0} not found on device")]
    ServiceNotFound(String),

    #[error("Device has no write characteristic, commands are unavailable")]
    NoWriteCharacteristic,

    #[error("Session is closed")]
    Closed,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: '{token}' is not a hex byte")]
    BadHex { line: usize, token: String },
}
