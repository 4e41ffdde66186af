//! Error types for Drishti

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Drishti error types
///
/// Only [`Error::Config`] and [`Error::ConfigParse`] are fatal; they abort
/// node construction. Everything else is logged by the recognition loop and
/// the loop continues with the next tick.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed TOML configuration (includes missing required parameters)
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A model could not be loaded into the registry
    #[error("Failed to load model \"{label}\": {reason}")]
    ModelLoad {
        /// Model label
        label: String,
        /// Failure description
        reason: String,
    },

    /// A resource URI could not be fetched
    #[error("Failed to retrieve resource {uri}: {reason}")]
    Resource {
        /// Requested URI
        uri: String,
        /// Failure description
        reason: String,
    },

    /// No dominant plane could be estimated for the cloud
    #[error("Could not estimate a planar model for the given dataset")]
    NoPlaneFound,

    /// Frame transform unavailable
    #[error("No transform from {source_frame} to {target}: {reason}")]
    Transform {
        /// Requested target frame
        target: String,
        /// Frame the data is expressed in
        source_frame: String,
        /// Failure description
        reason: String,
    },

    /// Inbound message could not be decoded
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Recognition engine failure
    #[error("Recognition engine error: {0}")]
    Engine(String),

    /// Result could not be delivered to its sink
    #[error("Publish error: {0}")]
    Publish(String),

    /// Result serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
