//! Cursor over a received byte buffer.
//!
//! All multi-byte integers are big-endian. Every read checks the remaining
//! length *before* moving the cursor, so a failed read leaves the reader
//! exactly where it was. The frame decoder relies on this: a frame that is
//! cut off mid-way is simply decoded again from the start once more bytes
//! have arrived.

use crate::{CharacterId, Location, ProtocolError};

/// Forward-only reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct NetReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> NetReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Takes the next `len` bytes, or fails without moving the cursor.
    fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let available = self.remaining();
        if available < len {
            return Err(ProtocolError::InsufficientData {
                needed: len,
                available,
            });
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..start + len])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Reads one byte as a flag; any non-zero value is `true`.
    pub fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16, ProtocolError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ProtocolError> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    /// Reads a text field: a `u16` byte length followed by UTF-8 bytes.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the server has been
    /// known to send Latin-1 in free-text fields and a garbled name is
    /// better than a dropped message. If the body is incomplete, the length
    /// prefix is not consumed either.
    pub fn read_string(&mut self) -> Result<String, ProtocolError> {
        let start = self.pos;
        let len = usize::from(self.read_u16()?);
        match self.take(len) {
            Ok(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Reads a location triple (x, y, z), 6 bytes in total.
    pub fn read_location(&mut self) -> Result<Location, ProtocolError> {
        let bytes: [u8; Location::WIRE_SIZE] = self.take_array()?;
        Ok(Location {
            x: i16::from_be_bytes([bytes[0], bytes[1]]),
            y: i16::from_be_bytes([bytes[2], bytes[3]]),
            z: i16::from_be_bytes([bytes[4], bytes[5]]),
        })
    }

    pub fn read_character_id(&mut self) -> Result<CharacterId, ProtocolError> {
        Ok(CharacterId(self.read_u32()?))
    }
}
