//! Error types for sgser-core operations.
//!
//! Covers the failure modes of the in-memory image model: buffer
//! allocation, dimension checks and buffer/format consistency.
//!
//! # Usage
//!
//! ```rust
//! use sgser_core::{Error, Result};
//!
//! fn check(s: i32, t: i32, r: i32) -> Result<()> {
//!     if s <= 0 || t <= 0 || r <= 0 {
//!         return Err(Error::invalid_dimensions(s, t, r, "must be positive"));
//!     }
//!     Ok(())
//! }
//! # assert!(check(0, 1, 1).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the image model.
#[derive(Debug, Error)]
pub enum Error {
    /// Memory allocation failed.
    ///
    /// Returned when a pixel buffer of the requested size cannot be
    /// reserved. Buffers are allocated fallibly so that a corrupt size
    /// field in a stream surfaces as an error instead of an abort.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },

    /// Invalid image dimensions.
    #[error("invalid dimensions: {s}x{t}x{r} ({reason})")]
    InvalidDimensions {
        /// Width
        s: i32,
        /// Height
        t: i32,
        /// Depth
        r: i32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Pixel buffer length does not match the size computed from
    /// dimensions, format, data type, packing and mipmap count.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Size computed from the image description
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },

    /// Pixel format / data type combination has no defined size.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(s: i32, t: i32, r: i32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            s,
            t,
            r,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(1 << 40, "capacity overflow");
        assert!(err.to_string().contains("capacity overflow"));
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 16, 1, "zero width");
        let msg = err.to_string();
        assert!(msg.contains("0x16x1"));
        assert!(!err.is_allocation_error());
    }

    #[test]
    fn test_size_mismatch_message() {
        let err = Error::BufferSizeMismatch {
            expected: 16,
            actual: 12,
        };
        assert_eq!(err.to_string(), "buffer size mismatch: expected 16 bytes, got 12");
    }
}
