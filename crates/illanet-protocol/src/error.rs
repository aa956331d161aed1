//! Error types for the protocol layer.
//!
//! The variants follow how far a failure reaches. `InsufficientData` never
//! leaves the framing boundary, `Malformed` costs one message, and
//! `UnknownCommand` costs the whole connection because the stream position
//! can no longer be trusted.

/// Errors that can occur while reading or writing the wire format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer ended before the value being read was complete.
    ///
    /// Not a real failure: the bytes simply have not arrived yet. The
    /// reader does not advance, so the same frame is decoded again once
    /// more data is buffered.
    #[error("insufficient data: needed {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },

    /// A structurally complete message carried a value that makes no sense,
    /// e.g. an unknown sub-type tag. The bytes the message occupies are
    /// still consumed, so framing stays aligned.
    #[error("malformed message 0x{command:02X}: {reason}")]
    Malformed { command: u8, reason: String },

    /// The command id at the start of a frame is not in the registry.
    #[error("unknown command id 0x{0:02X}")]
    UnknownCommand(u8),

    /// A text field is longer than its 16-bit length prefix can describe.
    #[error("string of {len} bytes exceeds the 65535 byte limit")]
    StringTooLong { len: usize },
}

impl ProtocolError {
    /// `true` if the caller should wait for more bytes and try again.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    /// `true` if the stream can no longer be decoded after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownCommand(_))
    }

    pub(crate) fn malformed(command: u8, reason: impl Into<String>) -> Self {
        Self::Malformed {
            command,
            reason: reason.into(),
        }
    }
}
