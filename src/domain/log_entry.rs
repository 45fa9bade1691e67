use super::error_record::ErrorRecord;
use serde::{Deserialize, Serialize};

/// An error read back from the backend, keyed by the identifier the backend
/// assigned when it was logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: String,
    pub error: ErrorRecord,
}

impl ErrorLogEntry {
    pub fn new(id: impl Into<String>, error: ErrorRecord) -> Self {
        Self {
            id: id.into(),
            error,
        }
    }
}
