//! Wire protocol for illanet.
//!
//! This crate defines the binary language the game client and server speak:
//!
//! - **Primitives** ([`NetReader`], [`NetWriter`]): big-endian integers,
//!   length-prefixed text, locations and character ids.
//! - **Messages** ([`ServerMessage`]): inbound frames, decoded once.
//! - **Commands** ([`Command`]): outbound frames, encoded once.
//! - **Registry** ([`Registry`]): id → decoder lookup and frame splitting.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between the byte stream and the game world. It
//! doesn't know about sockets or game state; it only turns bytes into
//! typed messages and typed commands into bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage) → World (execute)
//! ```
//!
//! # Framing
//!
//! Every frame is a single command id byte followed by that command's
//! payload. There is no length field: a decoder knows how many bytes its
//! payload takes, so the frame ends where the decoder stops reading.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod command;
mod error;
pub mod ids;
mod message;
mod reader;
mod registry;
mod tooltip;
mod types;
mod writer;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use command::Command;
pub use error::ProtocolError;
pub use message::{
    DialogSlot, DisconnectMsg, LookAtDialogItemMsg, MoveMode, MoveMsg, RemoveItemMsg,
    ServerMessage,
};
pub use reader::NetReader;
pub use registry::{DecodeFn, Frame, MessageDescriptor, Registry};
pub use tooltip::{GemLevels, Rareness, Tooltip};
pub use types::{CharacterId, CommandId, Location};
pub use writer::NetWriter;
