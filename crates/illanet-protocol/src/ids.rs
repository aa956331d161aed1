//! Command ids, one constant per frame type.
//!
//! `MSG_*` frames travel server → client, `CMD_*` frames client → server.

use crate::CommandId;

/// Server ends the session; payload is a one-byte reason.
pub const MSG_DISCONNECT: CommandId = 0xCC;
/// An item was taken off the top of a map tile.
pub const MSG_REMOVE_ITEM: CommandId = 0xC2;
/// A character moved, or the local player's move was answered.
pub const MSG_MOVE: CommandId = 0xDF;
/// Tooltip for a slot of an open crafting dialog.
pub const MSG_LOOKAT_DIALOG_ITEM: CommandId = 0x1B;

pub const CMD_LOGIN: CommandId = 0x0D;
pub const CMD_LOGOFF: CommandId = 0x20;
pub const CMD_KEEPALIVE: CommandId = 0xD8;
pub const CMD_CLOSE_DIALOG_CRAFTING: CommandId = 0x57;
pub const CMD_CRAFT_ITEM: CommandId = 0x58;
pub const CMD_LOOKAT_CRAFT_ITEM: CommandId = 0x59;
pub const CMD_LOOKAT_CRAFT_INGREDIENT: CommandId = 0x5A;
