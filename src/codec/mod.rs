//! Conversion between [`ErrorRecord`] and its string form on the wire.

pub mod xml;

use crate::domain::ErrorRecord;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

pub use xml::XmlErrorCodec;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("XML error: {0}")]
    Xml(String),
    #[error("Document has no <error> root element")]
    MissingRoot,
    #[error("Invalid time value '{0}'")]
    InvalidTime(String),
    #[error("Encoded document is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes error records for submission and decodes them from responses.
#[cfg_attr(test, automock)]
pub trait ErrorCodec: Send + Sync {
    fn encode(&self, error: &ErrorRecord) -> Result<String, CodecError>;
    fn decode(&self, encoded: &str) -> Result<ErrorRecord, CodecError>;
}
