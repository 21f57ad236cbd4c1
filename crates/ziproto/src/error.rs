//! Error taxonomy for the codec.

use thiserror::Error;
use ziproto_buffers::BufferError;

/// Failures raised by options construction, encoding, and decoding.
///
/// Every error aborts the current call and propagates to the caller;
/// nothing is retried internally and no partial result is produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Conflicting or out-of-range configuration at options construction.
    #[error("conflicting {group} options, valid flags: {allowed}")]
    InvalidOption {
        group: &'static str,
        allowed: &'static str,
    },

    /// The input value has no representable wire form under the active
    /// options.
    #[error("value cannot be encoded: {reason}")]
    EncodingFailed { reason: String },

    /// A tag byte matching no known pattern.
    #[error("unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownCode { tag: u8, offset: usize },

    /// A recognized tag that is inconsistent with the requested read.
    #[error("unexpected type tag 0x{tag:02x} at offset {offset}")]
    UnexpectedCode { tag: u8, offset: usize },

    /// The buffer holds fewer bytes than a declared length requires.
    #[error("insufficient data: {needed} bytes required, {remaining} available")]
    InsufficientData { needed: usize, remaining: usize },

    /// A decoded integer exceeds the signed 64-bit range under
    /// [`BigintMode::Error`](crate::BigintMode::Error).
    #[error("decoded integer {0} exceeds the signed 64-bit range")]
    IntegerOverflow(u64),

    /// A str-family payload is not valid UTF-8.
    #[error("invalid utf-8 in string payload ending at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// Nesting exceeded the configured maximum depth.
    #[error("nesting depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

impl From<BufferError> for Error {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer { needed, remaining } => {
                Error::InsufficientData { needed, remaining }
            }
        }
    }
}
