//! Recursive-descent encoder from [`Value`] trees to wire bytes.

use ziproto_buffers::Writer;

use crate::error::Error;
use crate::options::{ArrMapMode, EncodingOptions, FloatMode, StrBinMode};
use crate::value::{Extension, Value};

/// Serializes [`Value`] trees into the wire format.
///
/// Each [`encode`](Encoder::encode) call is independent and side-effect
/// free apart from returning a fresh byte buffer; the internal writer is
/// reused across calls to amortize allocation.
pub struct Encoder {
    writer: Writer,
    options: EncodingOptions,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates an encoder with the default options.
    pub fn new() -> Self {
        Self::with_options(EncodingOptions::from_defaults())
    }

    pub fn with_options(options: EncodingOptions) -> Self {
        Self {
            writer: Writer::new(),
            options,
        }
    }

    pub fn options(&self) -> &EncodingOptions {
        &self.options
    }

    /// Encodes one value into a fresh byte buffer.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, Error> {
        self.writer.reset();
        match self.write_any(value, 0) {
            Ok(()) => Ok(self.writer.flush()),
            Err(err) => {
                self.writer.reset();
                Err(err)
            }
        }
    }

    fn write_any(&mut self, value: &Value, depth: usize) -> Result<(), Error> {
        if depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int(i) => self.write_int(*i),
            Value::UInt(u) => self.write_uint(*u),
            Value::Float32(f) => self.write_float32(*f),
            Value::Float64(f) => self.write_float64(*f),
            Value::Str(s) => return self.write_str(s),
            Value::Bin(b) => return self.write_bytes(b),
            Value::Array(items) => return self.write_array(items, depth),
            Value::Map(pairs) => return self.write_map(pairs, depth),
            Value::Extension(ext) => return self.write_ext(ext),
        }
        Ok(())
    }

    pub fn write_nil(&mut self) {
        self.writer.u8(0xc0);
    }

    pub fn write_bool(&mut self, b: bool) {
        self.writer.u8(if b { 0xc3 } else { 0xc2 });
    }

    /// Writes a signed integer using the narrowest tag that covers it.
    ///
    /// Non-negative values take the unsigned tag family, matching the
    /// sign-based tag selection of the wire format.
    pub fn write_int(&mut self, int: i64) {
        if int >= 0 {
            self.write_uint(int as u64);
        } else if int >= -0x20 {
            self.writer.u8(int as u8); // negative fixint
        } else if int >= -0x80 {
            self.writer.u8u8(0xd0, int as u8);
        } else if int >= -0x8000 {
            self.writer.u8u16(0xd1, int as u16);
        } else if int >= -0x8000_0000 {
            self.writer.u8u32(0xd2, int as u32);
        } else {
            self.writer.u8u64(0xd3, int as u64);
        }
    }

    /// Writes an unsigned integer using the narrowest tag that covers it.
    pub fn write_uint(&mut self, uint: u64) {
        if uint <= 0x7f {
            self.writer.u8(uint as u8); // positive fixint
        } else if uint <= 0xff {
            self.writer.u8u8(0xcc, uint as u8);
        } else if uint <= 0xffff {
            self.writer.u8u16(0xcd, uint as u16);
        } else if uint <= 0xffff_ffff {
            self.writer.u8u32(0xce, uint as u32);
        } else {
            self.writer.u8u64(0xcf, uint);
        }
    }

    pub fn write_float32(&mut self, float: f32) {
        match self.options.float {
            FloatMode::ForceFloat32 => self.writer.u8f32(0xca, float),
            FloatMode::ForceFloat64 => self.writer.u8f64(0xcb, float as f64),
        }
    }

    pub fn write_float64(&mut self, float: f64) {
        match self.options.float {
            FloatMode::ForceFloat32 => self.writer.u8f32(0xca, float as f32),
            FloatMode::ForceFloat64 => self.writer.u8f64(0xcb, float),
        }
    }

    pub fn write_str_header(&mut self, length: usize) -> Result<(), Error> {
        if length <= 0x1f {
            self.writer.u8(0xa0 | length as u8);
        } else if length <= 0xff {
            self.writer.u8u8(0xd9, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xda, length as u16);
        } else if length <= 0xffff_ffff {
            self.writer.u8u32(0xdb, length as u32);
        } else {
            return Err(Error::EncodingFailed {
                reason: format!("string of {length} bytes exceeds the wire length range"),
            });
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), Error> {
        self.write_str_header(s.len())?;
        self.writer.utf8(s);
        Ok(())
    }

    pub fn write_bin_header(&mut self, length: usize) -> Result<(), Error> {
        if length <= 0xff {
            self.writer.u8u8(0xc4, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xc5, length as u16);
        } else if length <= 0xffff_ffff {
            self.writer.u8u32(0xc6, length as u32);
        } else {
            return Err(Error::EncodingFailed {
                reason: format!("binary payload of {length} bytes exceeds the wire length range"),
            });
        }
        Ok(())
    }

    pub fn write_bin(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.write_bin_header(bytes.len())?;
        self.writer.buf(bytes);
        Ok(())
    }

    /// Writes raw bytes of unknown semantic intent, resolved through the
    /// active str/bin mode.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        match self.options.str_bin {
            StrBinMode::ForceBin => self.write_bin(bytes),
            StrBinMode::ForceStr => match std::str::from_utf8(bytes) {
                Ok(s) => self.write_str(s),
                Err(_) => Err(Error::EncodingFailed {
                    reason: "FORCE_STR payload is not valid utf-8".to_owned(),
                }),
            },
            StrBinMode::Detect => match std::str::from_utf8(bytes) {
                Ok(s) => self.write_str(s),
                Err(_) => self.write_bin(bytes),
            },
        }
    }

    pub fn write_array_header(&mut self, length: usize) -> Result<(), Error> {
        if length <= 0xf {
            self.writer.u8(0x90 | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xdc, length as u16);
        } else if length <= 0xffff_ffff {
            self.writer.u8u32(0xdd, length as u32);
        } else {
            return Err(Error::EncodingFailed {
                reason: format!("array of {length} elements exceeds the wire length range"),
            });
        }
        Ok(())
    }

    fn write_array(&mut self, items: &[Value], depth: usize) -> Result<(), Error> {
        self.write_array_header(items.len())?;
        for item in items {
            self.write_any(item, depth + 1)?;
        }
        Ok(())
    }

    pub fn write_map_header(&mut self, length: usize) -> Result<(), Error> {
        if length <= 0xf {
            self.writer.u8(0x80 | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xde, length as u16);
        } else if length <= 0xffff_ffff {
            self.writer.u8u32(0xdf, length as u32);
        } else {
            return Err(Error::EncodingFailed {
                reason: format!("map of {length} pairs exceeds the wire length range"),
            });
        }
        Ok(())
    }

    /// Writes an ordered key/value collection, resolved through the active
    /// arr/map mode. An empty collection under detect resolves to an array.
    fn write_map(&mut self, pairs: &[(Value, Value)], depth: usize) -> Result<(), Error> {
        let as_array = match self.options.arr_map {
            ArrMapMode::ForceArr => true,
            ArrMapMode::ForceMap => false,
            ArrMapMode::Detect => dense_int_run(pairs),
        };
        if as_array {
            self.write_array_header(pairs.len())?;
            for (_, value) in pairs {
                self.write_any(value, depth + 1)?;
            }
        } else {
            self.write_map_header(pairs.len())?;
            for (key, value) in pairs {
                self.write_any(key, depth + 1)?;
                self.write_any(value, depth + 1)?;
            }
        }
        Ok(())
    }

    pub fn write_ext_header(&mut self, code: u8, length: usize) -> Result<(), Error> {
        match length {
            1 => self.writer.u8u8(0xd4, code),
            2 => self.writer.u8u8(0xd5, code),
            4 => self.writer.u8u8(0xd6, code),
            8 => self.writer.u8u8(0xd7, code),
            16 => self.writer.u8u8(0xd8, code),
            _ => {
                if length <= 0xff {
                    self.writer.u8u8(0xc7, length as u8);
                } else if length <= 0xffff {
                    self.writer.u8u16(0xc8, length as u16);
                } else if length <= 0xffff_ffff {
                    self.writer.u8u32(0xc9, length as u32);
                } else {
                    return Err(Error::EncodingFailed {
                        reason: format!(
                            "extension payload of {length} bytes exceeds the wire length range"
                        ),
                    });
                }
                self.writer.u8(code);
            }
        }
        Ok(())
    }

    pub fn write_ext(&mut self, ext: &Extension) -> Result<(), Error> {
        self.write_ext_header(ext.code, ext.payload.len())?;
        self.writer.buf(&ext.payload);
        Ok(())
    }
}

/// True when the keys are exactly `Int(0), Int(1), ..` in order.
fn dense_int_run(pairs: &[(Value, Value)]) -> bool {
    pairs
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, Value::Int(k) if *k == i as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_int_run() {
        let dense = vec![
            (Value::Int(0), Value::Nil),
            (Value::Int(1), Value::Nil),
        ];
        assert!(dense_int_run(&dense));

        let sparse = vec![
            (Value::Int(0), Value::Nil),
            (Value::Int(2), Value::Nil),
        ];
        assert!(!dense_int_run(&sparse));

        let keyed = vec![(Value::Str("a".into()), Value::Nil)];
        assert!(!dense_int_run(&keyed));

        assert!(dense_int_run(&[]));
    }

    #[test]
    fn test_failed_encode_discards_partial_output() {
        let mut encoder =
            Encoder::with_options(EncodingOptions::from_defaults().with_max_depth(1));
        let nested = Value::Array(vec![Value::Array(vec![Value::Array(vec![])])]);
        assert!(encoder.encode(&nested).is_err());
        // The next encode must not carry bytes from the aborted call.
        assert_eq!(encoder.encode(&Value::Nil), Ok(vec![0xc0]));
    }
}
