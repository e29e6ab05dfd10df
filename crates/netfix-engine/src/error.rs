//! Error types for netfix-engine

use thiserror::Error;

/// Result type alias using netfix-engine Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a conversation.
///
/// Unrecognized user answers are not errors: they produce a re-prompt.
#[derive(Error, Debug)]
pub enum Error {
    /// A fact name that the engine does not track
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// A value that does not fit the slot's type
    #[error("Invalid value for slot {slot}: {value}")]
    InvalidSlotValue { slot: String, value: String },

    /// A single turn queued more internal steps than allowed
    #[error("Turn exceeded {0} internal steps")]
    StepLimit(usize),

    /// Episode storage failed
    #[error("Store error: {0}")]
    Store(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-value error for a slot
    pub fn invalid_value(slot: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSlotValue {
            slot: slot.into(),
            value: value.into(),
        }
    }

    /// Whether this error came from the storage layer rather than the dialogue logic
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Store(_) | Error::Io(_) | Error::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(Error::Store("disk full".into()).is_storage());
        assert!(Error::Io(std::io::Error::other("boom")).is_storage());
        assert!(!Error::StepLimit(16).is_storage());
        assert!(!Error::UnknownSlot("color".into()).is_storage());
    }

    #[test]
    fn test_invalid_value_display() {
        let e = Error::invalid_value("device_type", "tablet");
        assert_eq!(e.to_string(), "Invalid value for slot device_type: tablet");
    }
}
