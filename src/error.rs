//! Error handling for the hwwatch monitor.

use crate::monitor::Channel;

/// A specialized `Result` type for hwwatch operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// The main error type for hwwatch.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a sample from the hardware failed
    #[error("Failed to read {channel} registers: {reason}")]
    HardwareRead { channel: Channel, reason: String },

    /// An action could not be invoked
    #[error("Failed to invoke action '{action}': {source}")]
    ActionDispatch {
        action: String,
        #[source]
        source: std::io::Error,
    },

    /// A condition was evaluated before the channel was ever sampled
    #[error("No samples recorded for {0}")]
    EmptyHistory(Channel),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text is not valid JSON
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl MonitorError {
    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new hardware read error for `channel`
    pub fn hardware_error(channel: Channel, reason: impl Into<String>) -> Self {
        Self::HardwareRead {
            channel,
            reason: reason.into(),
        }
    }

    /// Create a new dispatch error for `action`
    pub fn dispatch_error(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::ActionDispatch {
            action: action.into(),
            source,
        }
    }

    /// Whether this error must stop the process rather than a single action.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ActionDispatch { .. })
    }
}
