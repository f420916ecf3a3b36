//! Error types for trace ingestion and correlation

/// Result type for trace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the trace engine.
///
/// Adapter-level degradation (an uninspectable selection, a missing
/// location) never surfaces here; it is recovered where it happens.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Detail level outside 0..=3
    #[error("Invalid detail level: {0} (expected 0..=3)")]
    InvalidDetailLevel(u8),

    /// Event delivered to a context that was already closed
    #[error("Trace context is closed and cannot accept further events")]
    ContextClosed,

    /// The checkpoint recorder failed while emitting
    #[error("Checkpoint recorder error: {0}")]
    Recorder(String),

    /// A stylesheet could not be scanned
    #[error("Stylesheet error: {0}")]
    Stylesheet(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new recorder error
    pub fn recorder<S: Into<String>>(msg: S) -> Self {
        Error::Recorder(msg.into())
    }

    /// Create a new stylesheet error
    pub fn stylesheet<S: Into<String>>(msg: S) -> Self {
        Error::Stylesheet(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}
