//! Encoder for outgoing frames, the dual of [`NetReader`](crate::NetReader).

use crate::{CharacterId, Location, ProtocolError};

/// Growable big-endian byte writer.
#[derive(Debug, Default, Clone)]
pub struct NetWriter {
    data: Vec<u8>,
}

impl NetWriter {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Writes a `u16` length prefix and the UTF-8 bytes of `value`.
    ///
    /// # Errors
    /// [`ProtocolError::StringTooLong`] if the text does not fit the prefix.
    /// Nothing is written in that case.
    pub fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        let len = u16::try_from(value.len())
            .map_err(|_| ProtocolError::StringTooLong { len: value.len() })?;
        self.write_u16(len);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    pub fn write_location(&mut self, loc: &Location) {
        self.write_i16(loc.x);
        self.write_i16(loc.y);
        self.write_i16(loc.z);
    }

    pub fn write_character_id(&mut self, id: CharacterId) {
        self.write_u32(id.0);
    }
}
