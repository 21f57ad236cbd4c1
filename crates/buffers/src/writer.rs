//! Binary buffer writer with auto-growing capacity.

/// An append-only binary buffer writer that grows as needed.
///
/// # Example
///
/// ```
/// use ziproto_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// assert_eq!(writer.flush(), [0x01, 0x02, 0x03]);
/// ```
pub struct Writer {
    buf: Vec<u8>,
    /// Position where the last flush happened.
    x0: usize,
    /// Current cursor position.
    x: usize,
    /// Allocation step when the buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a writer with the default allocation step (16KB).
    pub fn new() -> Self {
        Self::with_alloc_size(16 * 1024)
    }

    /// Creates a writer with a custom allocation step.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            buf: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Ensures at least `capacity` bytes are writable past the cursor.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.buf.len() - self.x;
        if remaining < capacity {
            let pending = self.x - self.x0;
            let required = pending + capacity;
            let new_size = if required <= self.alloc_size {
                self.alloc_size
            } else {
                required * 2
            };
            let mut new_buf = vec![0u8; new_size];
            new_buf[..pending].copy_from_slice(&self.buf[self.x0..self.x]);
            self.buf = new_buf;
            self.x = pending;
            self.x0 = 0;
        }
    }

    /// Discards any unflushed bytes.
    pub fn reset(&mut self) {
        self.x = self.x0;
    }

    /// Returns the bytes written since the last flush and advances the
    /// flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.buf[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.buf[self.x] = val;
        self.x += 1;
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.u8(val as u8);
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.ensure_capacity(2);
        self.buf[self.x..self.x + 2].copy_from_slice(&val.to_be_bytes());
        self.x += 2;
    }

    /// Writes a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.u16(val as u16);
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        self.buf[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
    }

    /// Writes a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.u32(val as u32);
    }

    /// Writes an unsigned 64-bit integer (big-endian).
    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.ensure_capacity(8);
        self.buf[self.x..self.x + 8].copy_from_slice(&val.to_be_bytes());
        self.x += 8;
    }

    /// Writes a signed 64-bit integer (big-endian).
    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.u64(val as u64);
    }

    /// Writes a 32-bit IEEE-754 float (big-endian bit pattern).
    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.u32(val.to_bits());
    }

    /// Writes a 64-bit IEEE-754 float (big-endian bit pattern).
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.u64(val.to_bits());
    }

    /// Writes a tag byte followed by an unsigned 8-bit field.
    pub fn u8u8(&mut self, tag: u8, val: u8) {
        self.ensure_capacity(2);
        self.buf[self.x] = tag;
        self.buf[self.x + 1] = val;
        self.x += 2;
    }

    /// Writes a tag byte followed by an unsigned 16-bit field (big-endian).
    pub fn u8u16(&mut self, tag: u8, val: u16) {
        self.ensure_capacity(3);
        self.buf[self.x] = tag;
        self.buf[self.x + 1..self.x + 3].copy_from_slice(&val.to_be_bytes());
        self.x += 3;
    }

    /// Writes a tag byte followed by an unsigned 32-bit field (big-endian).
    pub fn u8u32(&mut self, tag: u8, val: u32) {
        self.ensure_capacity(5);
        self.buf[self.x] = tag;
        self.buf[self.x + 1..self.x + 5].copy_from_slice(&val.to_be_bytes());
        self.x += 5;
    }

    /// Writes a tag byte followed by an unsigned 64-bit field (big-endian).
    pub fn u8u64(&mut self, tag: u8, val: u64) {
        self.ensure_capacity(9);
        self.buf[self.x] = tag;
        self.buf[self.x + 1..self.x + 9].copy_from_slice(&val.to_be_bytes());
        self.x += 9;
    }

    /// Writes a tag byte followed by a 32-bit float (big-endian).
    pub fn u8f32(&mut self, tag: u8, val: f32) {
        self.u8u32(tag, val.to_bits());
    }

    /// Writes a tag byte followed by a 64-bit float (big-endian).
    pub fn u8f64(&mut self, tag: u8, val: f64) {
        self.u8u64(tag, val.to_bits());
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, bytes: &[u8]) {
        let length = bytes.len();
        self.ensure_capacity(length);
        self.buf[self.x..self.x + length].copy_from_slice(bytes);
        self.x += length;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.buf(s.as_bytes());
        s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u16() {
        let mut writer = Writer::new();
        writer.u16(0x0102);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u8u32() {
        let mut writer = Writer::new();
        writer.u8u32(0xce, 0x01020304);
        assert_eq!(writer.flush(), [0xce, 0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_i64_roundtrip() {
        let mut writer = Writer::new();
        writer.i64(-9_999_999_999i64);
        let data = writer.flush();
        assert_eq!(
            i64::from_be_bytes(data.try_into().unwrap()),
            -9_999_999_999i64
        );
    }

    #[test]
    fn test_f64() {
        let mut writer = Writer::new();
        writer.f64(1.5);
        assert_eq!(writer.flush(), 1.5f64.to_be_bytes());
    }

    #[test]
    fn test_utf8() {
        let mut writer = Writer::new();
        let n = writer.utf8("héllo");
        let data = writer.flush();
        assert_eq!(n, data.len());
        assert_eq!(std::str::from_utf8(&data).unwrap(), "héllo");
    }

    #[test]
    fn test_growth_past_alloc_size() {
        let mut writer = Writer::with_alloc_size(4);
        writer.buf(&[0xaa; 100]);
        writer.u8(0xbb);
        let data = writer.flush();
        assert_eq!(data.len(), 101);
        assert_eq!(data[99], 0xaa);
        assert_eq!(data[100], 0xbb);
    }

    #[test]
    fn test_flush_multiple() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn test_reset_discards_pending() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02);
        writer.reset();
        writer.u8(0x03);
        assert_eq!(writer.flush(), [0x03]);
    }
}
