//! ZiProto — a MessagePack-family binary codec.
//!
//! Converts in-memory [`Value`] trees (maps, sequences, strings, binary
//! blobs, integers of varying width, floats, booleans, nil) to and from a
//! compact self-describing byte format, with configurable policy for the
//! ambiguities a dynamic host representation conflates: string vs. binary
//! and ordered-list vs. map.
//!
//! The codec is a pure in-memory transform: no I/O, no shared state
//! between calls, no schema. Options records are immutable and safe to
//! reuse across threads.
//!
//! # Example
//!
//! ```
//! use ziproto::{decode, encode, DecodingOptions, EncodingOptions, Value};
//!
//! let value = Value::Map(vec![
//!     (Value::Str("id".into()), Value::Int(7)),
//!     (Value::Str("tags".into()), Value::Array(vec![Value::Str("a".into())])),
//! ]);
//! let bytes = encode(&value, &EncodingOptions::from_defaults()).unwrap();
//! let back = decode(&bytes, &DecodingOptions::from_defaults()).unwrap();
//! assert_eq!(back, value);
//! ```

mod decoder;
mod encoder;
mod error;
mod ext;
mod options;
mod value;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::Error;
pub use ext::{ExtHandler, ExtensionRegistry};
pub use options::{
    ArrMapMode, BigintMode, DecodingOptions, EncodingOptions, FloatMode, StrBinMode,
    BIGINT_AS_EXCEPTION, BIGINT_AS_GMP, BIGINT_AS_STR, DEFAULT_MAX_DEPTH, DETECT_ARR_MAP,
    DETECT_STR_BIN, FORCE_ARR, FORCE_BIN, FORCE_FLOAT32, FORCE_FLOAT64, FORCE_MAP, FORCE_STR,
};
pub use value::{Extension, Value};
pub use ziproto_buffers::{BufferError, Reader, Writer};

/// Encodes one value into a fresh byte buffer.
pub fn encode(value: &Value, options: &EncodingOptions) -> Result<Vec<u8>, Error> {
    Encoder::with_options(*options).encode(value)
}

/// Decodes one value from the start of `input`; trailing bytes are
/// permitted and ignored.
pub fn decode(input: &[u8], options: &DecodingOptions) -> Result<Value, Error> {
    Decoder::with_options(*options).decode(input)
}
