use thiserror::Error;

/// Common error type for South plugins.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The device or system could not produce a reading.
    #[error("Data retrieval error: {0}")]
    DataRetrieval(String),

    #[error("Error in executing command \"{command}\". Error: {message}")]
    Command { command: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR serialization error: {0}")]
    Cbor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a data retrieval error.
    pub fn data_retrieval(msg: impl Into<String>) -> Self {
        Self::DataRetrieval(msg.into())
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Cbor(e.to_string())
    }
}

/// Result type alias using the South plugin [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
