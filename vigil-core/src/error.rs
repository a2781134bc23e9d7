//! Error types for the tracking engine.
//!
//! Misuse of the tracking API is a programming error in the host, not a
//! recoverable condition. Errors are returned to the caller that violated the
//! contract instead of being absorbed, so a broken computation boundary
//! surfaces immediately rather than as a stale-value bug much later.
//!
//! Some conditions are deliberately *not* errors: reading a tracked property
//! outside any frame, writing to a frozen object, or asking for the tag of a
//! value with no identity. Those are tolerated silently.

use thiserror::Error;

/// Errors raised when the tracking API contract is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackError {
    /// Attempted to dirty a tag that is not updatable.
    #[error("cannot dirty a {kind} tag; only updatable tags carry a dirtyable revision")]
    InvalidOperation {
        /// Kind of tag the operation was attempted on.
        kind: &'static str,
    },

    /// A track frame was ended without a matching begin.
    #[error("track frame ended without a matching begin")]
    UnpairedTrackFrame,
}
