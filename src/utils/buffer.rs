use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Growable byte buffer with a read cursor.
///
/// Writes always append; reads advance the cursor and fail with
/// `UnexpectedEof` instead of panicking when the buffer runs short.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl ByteBuffer {
    /// Create a new ByteBuffer from bytes
    pub fn new(data: Vec<u8>) -> Self {
        ByteBuffer {
            buffer: data,
            cursor: 0,
        }
    }

    /// Create an empty ByteBuffer with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Drain a reader into a new buffer
    pub fn from_reader<R: Read + ?Sized>(reader: &mut R) -> IoResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(ByteBuffer::new(data))
    }

    /// Get current cursor position
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Get remaining bytes from current position
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Check if buffer has at least n bytes remaining
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    fn unread(&self) -> &[u8] {
        &self.buffer[self.cursor..]
    }

    fn take(&mut self, len: usize) -> IoResult<&[u8]> {
        if !self.has_remaining(len) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.buffer[start..start + len])
    }

    /// Read bytes into buffer
    pub fn read_bytes(&mut self, len: usize) -> IoResult<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    /// Read everything after the cursor
    pub fn read_remaining(&mut self) -> Vec<u8> {
        let rest = self.unread().to_vec();
        self.cursor = self.buffer.len();
        rest
    }

    pub fn read_u8(&mut self) -> IoResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_be(&mut self) -> IoResult<u16> {
        self.take(2)?.read_u16::<BigEndian>()
    }

    pub fn read_i16_be(&mut self) -> IoResult<i16> {
        self.take(2)?.read_i16::<BigEndian>()
    }

    pub fn read_u24_be(&mut self) -> IoResult<u32> {
        self.take(3)?.read_u24::<BigEndian>()
    }

    pub fn read_u32_be(&mut self) -> IoResult<u32> {
        self.take(4)?.read_u32::<BigEndian>()
    }

    pub fn read_u32_le(&mut self) -> IoResult<u32> {
        self.take(4)?.read_u32::<LittleEndian>()
    }

    pub fn read_f64_be(&mut self) -> IoResult<f64> {
        self.take(8)?.read_f64::<BigEndian>()
    }

    /// Write bytes to buffer
    pub fn write_bytes(&mut self, data: &[u8]) -> IoResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> IoResult<()> {
        self.buffer.write_u8(value)
    }

    pub fn write_u16_be(&mut self, value: u16) -> IoResult<()> {
        self.buffer.write_u16::<BigEndian>(value)
    }

    pub fn write_i16_be(&mut self, value: i16) -> IoResult<()> {
        self.buffer.write_i16::<BigEndian>(value)
    }

    /// Write the low 24 bits of `value`
    pub fn write_u24_be(&mut self, value: u32) -> IoResult<()> {
        if value > 0xFF_FFFF {
            return Err(IoError::new(ErrorKind::InvalidInput, "Value exceeds 24 bits"));
        }
        self.buffer.write_u24::<BigEndian>(value)
    }

    pub fn write_u32_be(&mut self, value: u32) -> IoResult<()> {
        self.buffer.write_u32::<BigEndian>(value)
    }

    pub fn write_u32_le(&mut self, value: u32) -> IoResult<()> {
        self.buffer.write_u32::<LittleEndian>(value)
    }

    pub fn write_f64_be(&mut self, value: f64) -> IoResult<()> {
        self.buffer.write_f64::<BigEndian>(value)
    }

    /// Get all bytes as Vec
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Consume the buffer, returning every byte written to it
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Get slice of underlying buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear buffer and reset cursor
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
