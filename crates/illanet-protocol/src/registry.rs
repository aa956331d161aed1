//! Message registry and frame decoding.
//!
//! The registry maps a command id byte to a [`MessageDescriptor`]: a name
//! for log lines and a decode function that turns the payload into a
//! [`ServerMessage`]. The table is fixed at compile time and every id is
//! unique, so lookup is an index into a 256-entry array.
//!
//! ```text
//! buffer ──► [id] ──► descriptor? ──► decode(payload) ──► Frame
//!                        │ no                 │ short
//!                        ▼                    ▼
//!               UnknownCommand (fatal)  InsufficientData (retry later)
//! ```

use tracing::trace;

use crate::ids::{MSG_DISCONNECT, MSG_LOOKAT_DIALOG_ITEM, MSG_MOVE, MSG_REMOVE_ITEM};
use crate::{
    CommandId, DisconnectMsg, LookAtDialogItemMsg, MoveMsg, NetReader, ProtocolError,
    RemoveItemMsg, ServerMessage,
};

/// Function that decodes one message payload (id byte already consumed).
pub type DecodeFn = fn(&mut NetReader<'_>) -> Result<ServerMessage, ProtocolError>;

/// Static description of one inbound message kind.
#[derive(Debug)]
pub struct MessageDescriptor {
    pub id: CommandId,
    pub name: &'static str,
    pub decode: DecodeFn,
}

// One entry per inbound message. Adding a message means adding a variant to
// `ServerMessage` and a line here.
static DESCRIPTORS: &[MessageDescriptor] = &[
    MessageDescriptor {
        id: MSG_MOVE,
        name: "Move",
        decode: |r| MoveMsg::decode(r).map(ServerMessage::Move),
    },
    MessageDescriptor {
        id: MSG_REMOVE_ITEM,
        name: "RemoveItem",
        decode: |r| RemoveItemMsg::decode(r).map(ServerMessage::RemoveItem),
    },
    MessageDescriptor {
        id: MSG_LOOKAT_DIALOG_ITEM,
        name: "LookAtDialogItem",
        decode: |r| LookAtDialogItemMsg::decode(r).map(ServerMessage::LookAtDialogItem),
    },
    MessageDescriptor {
        id: MSG_DISCONNECT,
        name: "Disconnect",
        decode: |r| DisconnectMsg::decode(r).map(ServerMessage::Disconnect),
    },
];

/// The result of decoding one frame from the head of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command id of the frame.
    pub command: CommandId,
    /// Bytes to drop from the front of the buffer, id byte included.
    pub consumed: usize,
    /// The decoded message, or [`ProtocolError::Malformed`] if the payload
    /// was complete but made no sense. Either way `consumed` is valid.
    pub outcome: Result<ServerMessage, ProtocolError>,
}

/// Lookup table from command id to message descriptor.
#[derive(Debug)]
pub struct Registry {
    by_id: [Option<&'static MessageDescriptor>; 256],
}

impl Registry {
    pub fn new() -> Self {
        let mut by_id = [None; 256];
        for descriptor in DESCRIPTORS {
            by_id[usize::from(descriptor.id)] = Some(descriptor);
        }
        Self { by_id }
    }

    pub fn descriptor(&self, id: CommandId) -> Option<&'static MessageDescriptor> {
        self.by_id[usize::from(id)]
    }

    pub fn is_known(&self, id: CommandId) -> bool {
        self.descriptor(id).is_some()
    }

    /// All registered descriptors in id order.
    pub fn descriptors(&self) -> impl Iterator<Item = &'static MessageDescriptor> + '_ {
        self.by_id.iter().filter_map(|d| *d)
    }

    /// Decodes the frame at the start of `buf`.
    ///
    /// # Errors
    /// - [`ProtocolError::InsufficientData`] if the frame is not complete
    ///   yet. Nothing is consumed; call again when more bytes arrive.
    /// - [`ProtocolError::UnknownCommand`] if the id byte is not registered.
    ///   The stream cannot be resynchronised after this.
    ///
    /// A malformed payload is *not* an `Err` here: it comes back as a
    /// [`Frame`] whose `outcome` holds the error, so the caller can skip it
    /// and keep reading.
    pub fn decode_frame(&self, buf: &[u8]) -> Result<Frame, ProtocolError> {
        let mut reader = NetReader::new(buf);
        let command = reader.read_u8()?;
        let descriptor = self
            .descriptor(command)
            .ok_or(ProtocolError::UnknownCommand(command))?;

        let outcome = match (descriptor.decode)(&mut reader) {
            Err(e) if e.is_incomplete() => return Err(e),
            other => other,
        };
        let consumed = reader.position();
        trace!(
            command = descriptor.name,
            consumed,
            ok = outcome.is_ok(),
            "decoded frame"
        );

        Ok(Frame {
            command,
            consumed,
            outcome,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
