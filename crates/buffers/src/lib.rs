//! Binary buffer primitives: a bounds-checked cursor [`Reader`] and an
//! auto-growing [`Writer`].
//!
//! These are the byte-level building blocks of the ziproto codec. The
//! reader never panics on short input; every read returns
//! [`BufferError::EndOfBuffer`] with the exact shortfall instead.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use std::fmt;

/// Errors produced by buffer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read required more bytes than the buffer holds.
    EndOfBuffer {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::EndOfBuffer { needed, remaining } => write!(
                f,
                "end of buffer: {needed} bytes required, {remaining} available"
            ),
        }
    }
}

impl std::error::Error for BufferError {}
