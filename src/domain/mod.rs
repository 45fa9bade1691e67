//! Domain layer for the elmah.io error log.
//!
//! Contains the canonical types shared across all modules:
//! - `ErrorRecord`: The error as captured by the host application
//! - `ErrorLogEntry`: A stored error paired with its backend identifier
//! - `ErrorLogError`: Top-level error type

pub mod error;
pub mod error_record;
pub mod log_entry;

pub use error::{DecodingError, ErrorLogError};
pub use error_record::{ErrorRecord, NameValues};
pub use log_entry::ErrorLogEntry;
