//! Server → client messages.
//!
//! [`ServerMessage`] is a closed sum type over every frame the client knows
//! how to decode. Each variant owns exactly the fields its payload carries;
//! the fields are filled once by `decode` and only read afterwards.
//!
//! Decoders read every field first and validate afterwards. That ordering
//! matters: when a value turns out to be nonsense the message is reported
//! as [`ProtocolError::Malformed`], but the reader has already moved past
//! the whole payload, so the next frame still starts in the right place.

use std::fmt;

use crate::ids::{MSG_DISCONNECT, MSG_LOOKAT_DIALOG_ITEM, MSG_MOVE, MSG_REMOVE_ITEM};
use crate::{CharacterId, CommandId, Location, NetReader, NetWriter, ProtocolError, Tooltip};

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// A decoded inbound protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Move(MoveMsg),
    RemoveItem(RemoveItemMsg),
    LookAtDialogItem(LookAtDialogItemMsg),
    Disconnect(DisconnectMsg),
}

impl ServerMessage {
    /// The command id this message is framed with.
    pub fn id(&self) -> CommandId {
        match self {
            Self::Move(_) => MSG_MOVE,
            Self::RemoveItem(_) => MSG_REMOVE_ITEM,
            Self::LookAtDialogItem(_) => MSG_LOOKAT_DIALOG_ITEM,
            Self::Disconnect(_) => MSG_DISCONNECT,
        }
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move(_) => "Move",
            Self::RemoveItem(_) => "RemoveItem",
            Self::LookAtDialogItem(_) => "LookAtDialogItem",
            Self::Disconnect(_) => "Disconnect",
        }
    }

    /// Encodes the message as a full frame, id byte included.
    ///
    /// The client never sends these; this exists for test servers and
    /// traffic tools that need to produce server-side frames.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut w = NetWriter::with_capacity(16);
        w.write_u8(self.id());
        match self {
            Self::Move(m) => {
                w.write_character_id(m.character);
                w.write_location(&m.location);
                w.write_u8(m.mode.into());
                w.write_u16(m.duration_ms);
            }
            Self::RemoveItem(m) => {
                w.write_location(&m.location);
                w.write_u8(m.raw_movement_cost);
            }
            Self::LookAtDialogItem(m) => {
                w.write_i32(m.dialog_id);
                match m.target {
                    DialogSlot::Item { slot } => {
                        w.write_u8(0);
                        w.write_u8(slot);
                    }
                    DialogSlot::Ingredient { slot, ingredient } => {
                        w.write_u8(1);
                        w.write_u8(slot);
                        w.write_u8(ingredient);
                    }
                }
                m.tooltip.encode(&mut w)?;
            }
            Self::Disconnect(m) => w.write_u8(m.reason),
        }
        Ok(w.into_vec())
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(m) => write!(f, "Move[{m}]"),
            Self::RemoveItem(m) => write!(f, "RemoveItem[{m}]"),
            Self::LookAtDialogItem(m) => write!(f, "LookAtDialogItem[{m}]"),
            Self::Disconnect(m) => write!(f, "Disconnect[reason: {}]", m.reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// How a character got to its new location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    /// The local player asked to move before the previous step finished.
    TooEarly,
    /// Position correction without animation.
    NoMove,
    /// Regular walk.
    Move,
    /// Pushed by someone else.
    Push,
    Run,
}

impl MoveMode {
    pub const TOO_EARLY: u8 = 0x09;
    pub const NO_MOVE: u8 = 0x0A;
    pub const MOVE: u8 = 0x0B;
    pub const PUSH: u8 = 0x0C;
    pub const RUN: u8 = 0x0D;
}

impl TryFrom<u8> for MoveMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            Self::TOO_EARLY => Ok(Self::TooEarly),
            Self::NO_MOVE => Ok(Self::NoMove),
            Self::MOVE => Ok(Self::Move),
            Self::PUSH => Ok(Self::Push),
            Self::RUN => Ok(Self::Run),
            other => Err(other),
        }
    }
}

impl From<MoveMode> for u8 {
    fn from(mode: MoveMode) -> Self {
        match mode {
            MoveMode::TooEarly => MoveMode::TOO_EARLY,
            MoveMode::NoMove => MoveMode::NO_MOVE,
            MoveMode::Move => MoveMode::MOVE,
            MoveMode::Push => MoveMode::PUSH,
            MoveMode::Run => MoveMode::RUN,
        }
    }
}

impl fmt::Display for MoveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TooEarly => "too early",
            Self::NoMove => "no move",
            Self::Move => "move",
            Self::Push => "push",
            Self::Run => "run",
        };
        write!(f, "{name}(0x{:02X})", u8::from(*self))
    }
}

/// `MSG_MOVE`: character id, target location, mode, animation duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMsg {
    pub character: CharacterId,
    pub location: Location,
    pub mode: MoveMode,
    pub duration_ms: u16,
}

impl MoveMsg {
    /// Payload size, id byte excluded.
    pub const WIRE_SIZE: usize = CharacterId::WIRE_SIZE + Location::WIRE_SIZE + 1 + 2;

    pub fn decode(reader: &mut NetReader<'_>) -> Result<Self, ProtocolError> {
        let character = reader.read_character_id()?;
        let location = reader.read_location()?;
        let mode = reader.read_u8()?;
        let duration_ms = reader.read_u16()?;

        let mode = MoveMode::try_from(mode).map_err(|raw| {
            ProtocolError::malformed(MSG_MOVE, format!("unknown move mode 0x{raw:02X}"))
        })?;

        Ok(Self {
            character,
            location,
            mode,
            duration_ms,
        })
    }
}

impl fmt::Display for MoveMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {} mode: {} duration: {}ms",
            self.character, self.location, self.mode, self.duration_ms
        )
    }
}

// ---------------------------------------------------------------------------
// RemoveItem
// ---------------------------------------------------------------------------

/// `MSG_REMOVE_ITEM`: the top item of a tile is gone and the tile's
/// movement cost changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveItemMsg {
    pub location: Location,
    /// Raw cost byte as sent. Use [`movement_cost`](Self::movement_cost).
    pub raw_movement_cost: u8,
}

impl RemoveItemMsg {
    /// Cost byte meaning "not specified".
    pub const COST_UNSPECIFIED: u8 = 255;

    /// Payload size, id byte excluded.
    pub const WIRE_SIZE: usize = Location::WIRE_SIZE + 1;

    pub fn decode(reader: &mut NetReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            location: reader.read_location()?,
            raw_movement_cost: reader.read_u8()?,
        })
    }

    /// The new movement cost of the tile; `-1` when the server left it
    /// unspecified.
    pub fn movement_cost(&self) -> i32 {
        if self.raw_movement_cost == Self::COST_UNSPECIFIED {
            -1
        } else {
            i32::from(self.raw_movement_cost)
        }
    }
}

impl fmt::Display for RemoveItemMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "location: {} cost: {}", self.location, self.movement_cost())
    }
}

// ---------------------------------------------------------------------------
// LookAtDialogItem
// ---------------------------------------------------------------------------

/// Which slot of a crafting dialog a tooltip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogSlot {
    /// Type 0: a craftable item.
    Item { slot: u8 },
    /// Type 1: one ingredient of a craftable item.
    Ingredient { slot: u8, ingredient: u8 },
}

/// `MSG_LOOKAT_DIALOG_ITEM`: tooltip for a crafting dialog slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookAtDialogItemMsg {
    pub dialog_id: i32,
    pub target: DialogSlot,
    pub tooltip: Tooltip,
}

impl LookAtDialogItemMsg {
    /// Bytes consumed before the type tag is known to be valid.
    pub const PREFIX_SIZE: usize = 4 + 1;

    /// Decodes the payload.
    ///
    /// A type tag other than 0 or 1 is `Malformed`, and only the 5-byte
    /// prefix (dialog id and tag) is consumed. The server sends nothing
    /// after an unknown tag, so framing carries on from the next byte.
    pub fn decode(reader: &mut NetReader<'_>) -> Result<Self, ProtocolError> {
        let dialog_id = reader.read_i32()?;
        let kind = reader.read_u8()?;
        let target = match kind {
            0 => DialogSlot::Item {
                slot: reader.read_u8()?,
            },
            1 => DialogSlot::Ingredient {
                slot: reader.read_u8()?,
                ingredient: reader.read_u8()?,
            },
            other => {
                return Err(ProtocolError::malformed(
                    MSG_LOOKAT_DIALOG_ITEM,
                    format!("illegal type id {other}"),
                ));
            }
        };
        let tooltip = Tooltip::decode(reader)?;

        Ok(Self {
            dialog_id,
            target,
            tooltip,
        })
    }
}

impl fmt::Display for LookAtDialogItemMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            DialogSlot::Item { slot } => {
                write!(f, "dialog: {} type: 0 slot: {slot}", self.dialog_id)
            }
            DialogSlot::Ingredient { slot, ingredient } => write!(
                f,
                "dialog: {} type: 1 slot: {slot} secondary slot: {ingredient}",
                self.dialog_id
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Disconnect
// ---------------------------------------------------------------------------

/// `MSG_DISCONNECT`: the server is ending the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectMsg {
    pub reason: u8,
}

impl DisconnectMsg {
    pub fn decode(reader: &mut NetReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            reason: reader.read_u8()?,
        })
    }
}
