//! Error types for clipboard broker operations.

use thiserror::Error;

/// Result type for clipboard broker operations
pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Errors that can occur while mediating clipboard access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// The requested clipboard slot is not supported by this process
    #[error("clipboard slot not supported")]
    NotSupported,

    /// A required argument was missing or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Generic internal failure
    #[error("clipboard operation failed: {0}")]
    Failure(String),

    /// A snapshot went stale - the clipboard changed since it was captured
    #[error("clipboard data no longer available")]
    NotAvailable,

    /// Content inspection rejected the data; the caller's transferable was cleared
    #[error("content blocked by inspection")]
    ContentBlocked,

    /// Consent was denied, no prompt could be shown, or an incompatible
    /// prompt is already outstanding
    #[error("clipboard access not allowed")]
    NotAllowed,

    /// A pending request was superseded or torn down
    #[error("request aborted")]
    Aborted,

    /// Error reported by the native clipboard backend, surfaced verbatim
    #[error("backend error: {0}")]
    Backend(String),
}

impl ClipboardError {
    /// Returns true if this error is a security rejection (consent or
    /// inspection), meaning no data was delivered by policy
    pub fn is_security_block(&self) -> bool {
        matches!(self, Self::ContentBlocked | Self::NotAllowed)
    }

    /// Returns true if this error signals cancellation rather than failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns true if a caller may reasonably retry the operation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotAvailable | Self::Aborted)
    }
}
