//! Bounds-checked binary buffer reader with cursor tracking.

use crate::BufferError;

/// A sequential reader over a byte slice.
///
/// The reader maintains a cursor position and provides bounds-checked reads
/// of fixed-width big-endian fields and raw byte spans. Reads past the end
/// of the slice fail with [`BufferError::EndOfBuffer`] and leave the cursor
/// untouched.
///
/// # Example
///
/// ```
/// use ziproto_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.try_u8(), Ok(0x01));
/// assert_eq!(reader.try_u16(), Ok(0x0203));
/// assert!(reader.try_u8().is_err());
/// ```
pub struct Reader<'a> {
    data: &'a [u8],
    /// Current cursor position.
    x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Returns the number of unread bytes.
    pub fn size(&self) -> usize {
        self.data.len() - self.x
    }

    /// Returns the number of bytes consumed so far.
    pub fn pos(&self) -> usize {
        self.x
    }

    /// Checks that `n` more bytes are available from the current cursor.
    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        let remaining = self.size();
        if n > remaining {
            Err(BufferError::EndOfBuffer {
                needed: n,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn try_peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.data[self.x])
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.check(n)?;
        self.x += n;
        Ok(())
    }

    /// Reads the next `n` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, n: usize) -> Result<&'a [u8], BufferError> {
        self.check(n)?;
        let span = &self.data[self.x..self.x + n];
        self.x += n;
        Ok(span)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let val = self.data[self.x];
        self.x += 1;
        Ok(val)
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn try_i8(&mut self) -> Result<i8, BufferError> {
        self.try_u8().map(|v| v as i8)
    }

    /// Reads an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        self.check(2)?;
        let val = u16::from_be_bytes([self.data[self.x], self.data[self.x + 1]]);
        self.x += 2;
        Ok(val)
    }

    /// Reads a signed 16-bit integer (big-endian).
    #[inline]
    pub fn try_i16(&mut self) -> Result<i16, BufferError> {
        self.try_u16().map(|v| v as i16)
    }

    /// Reads an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.check(4)?;
        let val = u32::from_be_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
        ]);
        self.x += 4;
        Ok(val)
    }

    /// Reads a signed 32-bit integer (big-endian).
    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        self.try_u32().map(|v| v as i32)
    }

    /// Reads an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn try_u64(&mut self) -> Result<u64, BufferError> {
        self.check(8)?;
        let val = u64::from_be_bytes([
            self.data[self.x],
            self.data[self.x + 1],
            self.data[self.x + 2],
            self.data[self.x + 3],
            self.data[self.x + 4],
            self.data[self.x + 5],
            self.data[self.x + 6],
            self.data[self.x + 7],
        ]);
        self.x += 8;
        Ok(val)
    }

    /// Reads a signed 64-bit integer (big-endian).
    #[inline]
    pub fn try_i64(&mut self) -> Result<i64, BufferError> {
        self.try_u64().map(|v| v as i64)
    }

    /// Reads a 32-bit IEEE-754 float (big-endian bit pattern).
    #[inline]
    pub fn try_f32(&mut self) -> Result<f32, BufferError> {
        self.try_u32().map(f32::from_bits)
    }

    /// Reads a 64-bit IEEE-754 float (big-endian bit pattern).
    #[inline]
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        self.try_u64().map(f64::from_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_sequence() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u8(), Ok(0x01));
        assert_eq!(reader.try_u8(), Ok(0x02));
        assert_eq!(
            reader.try_u8(),
            Err(BufferError::EndOfBuffer {
                needed: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn test_u16_be() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u16(), Ok(0x0102));
    }

    #[test]
    fn test_i8_negative() {
        let data = [0xff];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_i8(), Ok(-1));
    }

    #[test]
    fn test_u64_be() {
        let data = 0x0102030405060708u64.to_be_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_u64(), Ok(0x0102030405060708));
    }

    #[test]
    fn test_f64_bit_pattern() {
        let data = 1.5f64.to_be_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_f64(), Ok(1.5));
    }

    #[test]
    fn test_short_read_reports_shortfall() {
        let data = [0x01, 0x02];
        let mut reader = Reader::new(&data);
        assert_eq!(
            reader.try_u32(),
            Err(BufferError::EndOfBuffer {
                needed: 4,
                remaining: 2
            })
        );
        // Failed reads must not advance the cursor.
        assert_eq!(reader.pos(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0xab];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_peek(), Ok(0xab));
        assert_eq!(reader.try_peek(), Ok(0xab));
        assert_eq!(reader.try_u8(), Ok(0xab));
    }

    #[test]
    fn test_buf_and_size() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.try_buf(3), Ok(&data[..3]));
        assert_eq!(reader.size(), 2);
        assert!(reader.try_buf(3).is_err());
    }
}
