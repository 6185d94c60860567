//! Error types for stream and serializer operations.
//!
//! Two severities exist in this crate. Fatal conditions (allocation
//! failure while reading a payload, undecodable base64, malformed tokens,
//! unknown classes) are returned as [`IoError`] and abort the current read
//! or write. Recoverable conditions (missing codec, unreadable external
//! file) are logged through `tracing` and never surface as errors.

use std::io;
use thiserror::Error;

/// Stream or serializer error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File or stream I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error from the image model.
    #[error(transparent)]
    Core(#[from] sgser_core::Error),

    /// Fatal stream-level failure; the current read is aborted.
    #[error("stream exception: {0}")]
    Exception(String),

    /// Text stream contained a different token than expected.
    #[error("unexpected token: expected {expected}, found {found:?}")]
    UnexpectedToken {
        /// What the reader expected.
        expected: String,
        /// What it found.
        found: String,
    },

    /// Text stream ended in the middle of a value.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Document header is missing or unsupported.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Object class name without a registered wrapper.
    #[error("unknown object class: {0}")]
    UnknownClass(String),

    /// No codec registered for a format or extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Image codec failed to decode.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Image codec or serializer failed to encode.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Option string or value parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl IoError {
    /// Creates an [`IoError::UnexpectedToken`] error.
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns `true` for fatal stream exceptions.
    pub fn is_exception(&self) -> bool {
        matches!(self, Self::Exception(_))
    }
}

/// Result type for stream and serializer operations.
pub type IoResult<T> = Result<T, IoError>;
