//! Recursive-descent decoder from wire bytes to [`Value`] trees.

use ziproto_buffers::Reader;

use crate::error::Error;
use crate::ext::ExtensionRegistry;
use crate::options::{BigintMode, DecodingOptions};
use crate::value::{Extension, Value};

/// Parses wire bytes back into [`Value`] trees.
///
/// Each [`decode`](Decoder::decode) call is a single recursive-descent
/// parse over its own cursor; trailing bytes after the top-level value are
/// permitted and ignored. The decoder holds no per-call state, so one
/// instance may serve concurrent calls behind a shared reference.
pub struct Decoder {
    options: DecodingOptions,
    extensions: ExtensionRegistry,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with the default options and no extensions.
    pub fn new() -> Self {
        Self::with_options(DecodingOptions::from_defaults())
    }

    pub fn with_options(options: DecodingOptions) -> Self {
        Self {
            options,
            extensions: ExtensionRegistry::new(),
        }
    }

    pub fn options(&self) -> &DecodingOptions {
        &self.options
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Registers an extension decoder for `code` (0..=127).
    pub fn register_ext<F>(&mut self, code: u8, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Reader<'_>, usize) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.extensions.register(code, handler)
    }

    /// Decodes one value from the start of `input`.
    pub fn decode(&self, input: &[u8]) -> Result<Value, Error> {
        let mut reader = Reader::new(input);
        self.read_value(&mut reader, 0)
    }

    /// Reads one value at the reader's current offset, for back-to-back
    /// streaming decodes over one buffer.
    pub fn read_any(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        self.read_value(reader, 0)
    }

    fn read_value(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Value, Error> {
        if depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }
        let tag = reader.try_u8()?;
        let offset = reader.pos() - 1;

        // negative fixint: 0xe0..=0xff
        if tag >= 0xe0 {
            return Ok(Value::Int(tag as i8 as i64));
        }
        // positive fixint: 0x00..=0x7f
        if tag <= 0x7f {
            return Ok(Value::Int(tag as i64));
        }
        // fixmap: 0x80..=0x8f
        if (0x80..=0x8f).contains(&tag) {
            return self.read_map(reader, tag as usize & 0xf, depth);
        }
        // fixarray: 0x90..=0x9f
        if (0x90..=0x9f).contains(&tag) {
            return self.read_array(reader, tag as usize & 0xf, depth);
        }
        // fixstr: 0xa0..=0xbf
        if (0xa0..=0xbf).contains(&tag) {
            return read_str(reader, tag as usize & 0x1f);
        }

        match tag {
            0xc0 => Ok(Value::Nil),
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            // bin8, bin16, bin32
            0xc4 => {
                let n = reader.try_u8()? as usize;
                Ok(Value::Bin(reader.try_buf(n)?.to_vec()))
            }
            0xc5 => {
                let n = reader.try_u16()? as usize;
                Ok(Value::Bin(reader.try_buf(n)?.to_vec()))
            }
            0xc6 => {
                let n = reader.try_u32()? as usize;
                Ok(Value::Bin(reader.try_buf(n)?.to_vec()))
            }
            // ext8, ext16, ext32
            0xc7 => {
                let n = reader.try_u8()? as usize;
                self.read_ext(reader, n)
            }
            0xc8 => {
                let n = reader.try_u16()? as usize;
                self.read_ext(reader, n)
            }
            0xc9 => {
                let n = reader.try_u32()? as usize;
                self.read_ext(reader, n)
            }
            // float32, float64
            0xca => Ok(Value::Float32(reader.try_f32()?)),
            0xcb => Ok(Value::Float64(reader.try_f64()?)),
            // uint8, uint16, uint32, uint64
            0xcc => Ok(Value::Int(reader.try_u8()? as i64)),
            0xcd => Ok(Value::Int(reader.try_u16()? as i64)),
            0xce => Ok(Value::Int(reader.try_u32()? as i64)),
            0xcf => self.read_u64(reader),
            // int8, int16, int32, int64
            0xd0 => Ok(Value::Int(reader.try_i8()? as i64)),
            0xd1 => Ok(Value::Int(reader.try_i16()? as i64)),
            0xd2 => Ok(Value::Int(reader.try_i32()? as i64)),
            0xd3 => Ok(Value::Int(reader.try_i64()?)),
            // fixext1, fixext2, fixext4, fixext8, fixext16
            0xd4 => self.read_ext(reader, 1),
            0xd5 => self.read_ext(reader, 2),
            0xd6 => self.read_ext(reader, 4),
            0xd7 => self.read_ext(reader, 8),
            0xd8 => self.read_ext(reader, 16),
            // str8, str16, str32
            0xd9 => {
                let n = reader.try_u8()? as usize;
                read_str(reader, n)
            }
            0xda => {
                let n = reader.try_u16()? as usize;
                read_str(reader, n)
            }
            0xdb => {
                let n = reader.try_u32()? as usize;
                read_str(reader, n)
            }
            // array16, array32
            0xdc => {
                let n = reader.try_u16()? as usize;
                self.read_array(reader, n, depth)
            }
            0xdd => {
                let n = reader.try_u32()? as usize;
                self.read_array(reader, n, depth)
            }
            // map16, map32
            0xde => {
                let n = reader.try_u16()? as usize;
                self.read_map(reader, n, depth)
            }
            0xdf => {
                let n = reader.try_u32()? as usize;
                self.read_map(reader, n, depth)
            }
            // 0xc1 is reserved by the format
            _ => Err(Error::UnknownCode { tag, offset }),
        }
    }

    fn read_u64(&self, reader: &mut Reader<'_>) -> Result<Value, Error> {
        let val = reader.try_u64()?;
        if val <= i64::MAX as u64 {
            return Ok(Value::Int(val as i64));
        }
        match self.options.bigint {
            BigintMode::Error => Err(Error::IntegerOverflow(val)),
            BigintMode::AsStr => Ok(Value::Str(val.to_string())),
            BigintMode::AsUnsigned => Ok(Value::UInt(val)),
        }
    }

    fn read_array(
        &self,
        reader: &mut Reader<'_>,
        count: usize,
        depth: usize,
    ) -> Result<Value, Error> {
        // Capacity is capped so a forged count cannot allocate unboundedly;
        // InsufficientData fires as soon as the payload runs short.
        let mut items = Vec::with_capacity(count.min(reader.size()));
        for _ in 0..count {
            items.push(self.read_value(reader, depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(
        &self,
        reader: &mut Reader<'_>,
        count: usize,
        depth: usize,
    ) -> Result<Value, Error> {
        let mut pairs = Vec::with_capacity(count.min(reader.size()));
        for _ in 0..count {
            let key = self.read_value(reader, depth + 1)?;
            let val = self.read_value(reader, depth + 1)?;
            pairs.push((key, val));
        }
        Ok(Value::Map(pairs))
    }

    fn read_ext(&self, reader: &mut Reader<'_>, size: usize) -> Result<Value, Error> {
        let code = reader.try_u8()?;
        let payload = reader.try_buf(size)?;
        if let Some(handler) = self.extensions.get(code) {
            let mut scoped = Reader::new(payload);
            handler(&mut scoped, size)
        } else {
            Ok(Value::Extension(Extension::new(code, payload.to_vec())))
        }
    }

    /// Skips one value at the reader's current offset and returns the
    /// number of bytes it occupied.
    pub fn skip_any(&self, reader: &mut Reader<'_>) -> Result<usize, Error> {
        let start = reader.pos();
        self.skip_value(reader, 0)?;
        Ok(reader.pos() - start)
    }

    fn skip_value(&self, reader: &mut Reader<'_>, depth: usize) -> Result<(), Error> {
        if depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }
        let tag = reader.try_u8()?;
        let offset = reader.pos() - 1;

        if tag >= 0xe0 || tag <= 0x7f {
            return Ok(());
        }
        if (0x80..=0x8f).contains(&tag) {
            return self.skip_pairs(reader, tag as usize & 0xf, depth);
        }
        if (0x90..=0x9f).contains(&tag) {
            return self.skip_items(reader, tag as usize & 0xf, depth);
        }
        if (0xa0..=0xbf).contains(&tag) {
            return Ok(reader.skip(tag as usize & 0x1f)?);
        }

        match tag {
            0xc0 | 0xc2 | 0xc3 => Ok(()),
            0xc4 | 0xd9 => {
                let n = reader.try_u8()? as usize;
                Ok(reader.skip(n)?)
            }
            0xc5 | 0xda => {
                let n = reader.try_u16()? as usize;
                Ok(reader.skip(n)?)
            }
            0xc6 | 0xdb => {
                let n = reader.try_u32()? as usize;
                Ok(reader.skip(n)?)
            }
            0xc7 => {
                let n = reader.try_u8()? as usize;
                Ok(reader.skip(n + 1)?)
            }
            0xc8 => {
                let n = reader.try_u16()? as usize;
                Ok(reader.skip(n + 1)?)
            }
            0xc9 => {
                let n = reader.try_u32()? as usize;
                Ok(reader.skip(n + 1)?)
            }
            0xca | 0xce | 0xd2 => Ok(reader.skip(4)?),
            0xcb | 0xcf | 0xd3 => Ok(reader.skip(8)?),
            0xcc | 0xd0 => Ok(reader.skip(1)?),
            0xcd | 0xd1 => Ok(reader.skip(2)?),
            0xd4 => Ok(reader.skip(2)?),
            0xd5 => Ok(reader.skip(3)?),
            0xd6 => Ok(reader.skip(5)?),
            0xd7 => Ok(reader.skip(9)?),
            0xd8 => Ok(reader.skip(17)?),
            0xdc => {
                let n = reader.try_u16()? as usize;
                self.skip_items(reader, n, depth)
            }
            0xdd => {
                let n = reader.try_u32()? as usize;
                self.skip_items(reader, n, depth)
            }
            0xde => {
                let n = reader.try_u16()? as usize;
                self.skip_pairs(reader, n, depth)
            }
            0xdf => {
                let n = reader.try_u32()? as usize;
                self.skip_pairs(reader, n, depth)
            }
            _ => Err(Error::UnknownCode { tag, offset }),
        }
    }

    fn skip_items(&self, reader: &mut Reader<'_>, count: usize, depth: usize) -> Result<(), Error> {
        for _ in 0..count {
            self.skip_value(reader, depth + 1)?;
        }
        Ok(())
    }

    fn skip_pairs(&self, reader: &mut Reader<'_>, count: usize, depth: usize) -> Result<(), Error> {
        for _ in 0..count {
            self.skip_value(reader, depth + 1)?;
            self.skip_value(reader, depth + 1)?;
        }
        Ok(())
    }

    /// Reads a str-family header, failing with [`Error::UnexpectedCode`]
    /// when the tag belongs to a different family. Returns the byte length.
    pub fn read_str_header(&self, reader: &mut Reader<'_>) -> Result<usize, Error> {
        let tag = reader.try_u8()?;
        let offset = reader.pos() - 1;
        if tag >> 5 == 0b101 {
            return Ok(tag as usize & 0x1f);
        }
        match tag {
            0xd9 => Ok(reader.try_u8()? as usize),
            0xda => Ok(reader.try_u16()? as usize),
            0xdb => Ok(reader.try_u32()? as usize),
            _ => Err(Error::UnexpectedCode { tag, offset }),
        }
    }

    /// Reads an array-family header. Returns the element count.
    pub fn read_array_header(&self, reader: &mut Reader<'_>) -> Result<usize, Error> {
        let tag = reader.try_u8()?;
        let offset = reader.pos() - 1;
        if tag >> 4 == 0b1001 {
            return Ok(tag as usize & 0xf);
        }
        match tag {
            0xdc => Ok(reader.try_u16()? as usize),
            0xdd => Ok(reader.try_u32()? as usize),
            _ => Err(Error::UnexpectedCode { tag, offset }),
        }
    }

    /// Reads a map-family header. Returns the pair count.
    pub fn read_map_header(&self, reader: &mut Reader<'_>) -> Result<usize, Error> {
        let tag = reader.try_u8()?;
        let offset = reader.pos() - 1;
        if tag >> 4 == 0b1000 {
            return Ok(tag as usize & 0xf);
        }
        match tag {
            0xde => Ok(reader.try_u16()? as usize),
            0xdf => Ok(reader.try_u32()? as usize),
            _ => Err(Error::UnexpectedCode { tag, offset }),
        }
    }
}

fn read_str(reader: &mut Reader<'_>, size: usize) -> Result<Value, Error> {
    let bytes = reader.try_buf(size)?;
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(Value::Str(s.to_owned())),
        Err(_) => Err(Error::InvalidUtf8 {
            offset: reader.pos(),
        }),
    }
}
