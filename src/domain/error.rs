use crate::app::config::ConfigError;
use crate::codec::CodecError;
use crate::sender::TransportError;
use thiserror::Error;

/// Top-level error type for error log operations.
#[derive(Error, Debug)]
pub enum ErrorLogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("Failed to encode error record: {0}")]
    Encoding(#[source] CodecError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to start runtime for blocking call: {0}")]
    Runtime(#[source] std::io::Error),
}

/// A response body that could not be turned into error log entries.
#[derive(Error, Debug)]
pub enum DecodingError {
    #[error("Malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed error XML: {0}")]
    Xml(#[from] CodecError),
}
