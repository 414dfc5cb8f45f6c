//! Error types for the persisted session slots.

use thiserror::Error;

/// Errors that can occur while reading or writing persisted session state.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Slot file could not be read or written.
    #[error("File I/O error on slot '{slot}'")]
    FileIo {
        /// The slot the operation was addressing
        slot: &'static str,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Slot contents could not be serialized.
    #[error("Serialization failed for slot '{slot}'")]
    SerializationFailed {
        /// The slot the operation was addressing
        slot: &'static str,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    /// Get the slot name the failed operation was addressing.
    pub fn slot(&self) -> &'static str {
        match self {
            StoreError::FileIo { slot, .. } | StoreError::SerializationFailed { slot, .. } => slot,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
