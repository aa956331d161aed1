//! The game world as seen by the network layer.
//!
//! The client's world model, GUI and movement animation live elsewhere.
//! Messages reach them only through the traits in this crate, which keeps
//! the protocol testable without a renderer: a test implements [`World`]
//! with a few recording structs and checks which calls a message made.
//!
//! # Key types
//!
//! - [`World`]: entry point handed to [`execute`] once per message
//! - [`Player`], [`People`], [`GameMap`], [`CraftingGui`],
//!   [`SessionEvents`]: the collaborators a message may touch
//! - [`execute`]: applies one decoded [`ServerMessage`](illanet_protocol::ServerMessage)

mod execute;

pub use execute::execute;

use std::time::Duration;

use illanet_protocol::{CharacterId, Location, Tooltip};

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// How a character animation moves between two tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMovementMode {
    Walk,
    Run,
    Push,
    /// Jump to the target without animating.
    None,
}

/// Owns the local player's walking animation and its timing.
pub trait MovementHandler {
    /// The server confirmed (or corrected) a step of the local player.
    fn execute_server_move(&mut self, mode: CharMovementMode, target: Location, duration: Duration);

    /// The server refused a step because the previous one had not finished.
    fn execute_server_move_too_early(&mut self);
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The local player.
pub trait Player {
    fn is_player(&self, id: CharacterId) -> bool;

    /// `true` if `location` is within the visible area, widened by
    /// `tolerance` tiles on every side.
    fn is_on_screen(&self, location: Location, tolerance: i32) -> bool;

    fn movement(&mut self) -> &mut dyn MovementHandler;
}

/// A character other than the local player.
pub trait Character {
    /// Places the character without animation.
    fn set_location(&mut self, location: Location);

    fn move_to(&mut self, location: Location, mode: CharMovementMode, duration: Duration);
}

/// All known characters.
pub trait People {
    fn remove_character(&mut self, id: CharacterId);

    /// Returns the character with this id, creating it if it is not known
    /// yet.
    fn access_character(&mut self, id: CharacterId) -> &mut dyn Character;
}

/// One tile of the map.
pub trait MapTile {
    fn remove_top_item(&mut self);

    /// Sets the cost to walk onto this tile; `-1` means unknown.
    fn set_movement_cost(&mut self, cost: i32);
}

pub trait GameMap {
    /// The tile at `location`, if it is loaded.
    fn tile_at(&mut self, location: Location) -> Option<&mut dyn MapTile>;
}

/// The crafting dialog.
pub trait CraftingGui {
    fn show_craft_item_tooltip(&mut self, dialog_id: i32, slot: u8, tooltip: &Tooltip);

    fn show_craft_ingredient_tooltip(
        &mut self,
        dialog_id: i32,
        slot: u8,
        ingredient: u8,
        tooltip: &Tooltip,
    );
}

/// Session-level notifications.
pub trait SessionEvents {
    /// The server announced it is closing the session.
    fn server_disconnect(&mut self, reason: u8);
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Everything a message may mutate while it executes.
///
/// Only ever used from the main loop, so none of the collaborators need to
/// be `Send` or synchronised.
pub trait World {
    fn player(&mut self) -> &mut dyn Player;

    fn people(&mut self) -> &mut dyn People;

    fn map(&mut self) -> &mut dyn GameMap;

    /// The crafting dialog, or `None` while the GUI is not set up yet.
    fn crafting_gui(&mut self) -> Option<&mut dyn CraftingGui>;

    fn session(&mut self) -> &mut dyn SessionEvents;
}
