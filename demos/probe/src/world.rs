//! A world that only logs what the server asks of it.

use std::time::Duration;

use illanet::prelude::*;
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingWorld {
    player: Option<CharacterId>,
    /// Server-initiated logout reason, once one arrives.
    pub disconnect_reason: Option<u8>,
    pub applied: u64,
}

impl LoggingWorld {
    pub fn new(player: Option<CharacterId>) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }
}

impl MovementHandler for LoggingWorld {
    fn execute_server_move(&mut self, mode: CharMovementMode, target: Location, duration: Duration) {
        self.applied += 1;
        info!(?mode, ?target, ?duration, "player moves");
    }

    fn execute_server_move_too_early(&mut self) {
        self.applied += 1;
        info!("player move refused: too early");
    }
}

impl Player for LoggingWorld {
    fn is_player(&self, id: CharacterId) -> bool {
        self.player == Some(id)
    }

    fn is_on_screen(&self, _location: Location, _tolerance: i32) -> bool {
        true
    }

    fn movement(&mut self) -> &mut dyn MovementHandler {
        self
    }
}

impl Character for LoggingWorld {
    fn set_location(&mut self, location: Location) {
        self.applied += 1;
        info!(?location, "character placed");
    }

    fn move_to(&mut self, location: Location, mode: CharMovementMode, duration: Duration) {
        self.applied += 1;
        info!(?location, ?mode, ?duration, "character moves");
    }
}

impl People for LoggingWorld {
    fn remove_character(&mut self, id: CharacterId) {
        self.applied += 1;
        info!(%id, "character removed");
    }

    fn access_character(&mut self, _id: CharacterId) -> &mut dyn Character {
        self
    }
}

impl MapTile for LoggingWorld {
    fn remove_top_item(&mut self) {
        self.applied += 1;
        info!("top item removed");
    }

    fn set_movement_cost(&mut self, cost: i32) {
        info!(cost, "movement cost changed");
    }
}

impl GameMap for LoggingWorld {
    fn tile_at(&mut self, _location: Location) -> Option<&mut dyn MapTile> {
        Some(self)
    }
}

impl CraftingGui for LoggingWorld {
    fn show_craft_item_tooltip(&mut self, dialog_id: i32, slot: u8, tooltip: &Tooltip) {
        self.applied += 1;
        info!(dialog_id, slot, item = %tooltip.name, "craft item tooltip");
    }

    fn show_craft_ingredient_tooltip(&mut self, dialog_id: i32, slot: u8, ingredient: u8, tooltip: &Tooltip) {
        self.applied += 1;
        info!(dialog_id, slot, ingredient, item = %tooltip.name, "ingredient tooltip");
    }
}

impl SessionEvents for LoggingWorld {
    fn server_disconnect(&mut self, reason: u8) {
        info!(reason, "server closes the session");
        self.disconnect_reason = Some(reason);
    }
}

impl World for LoggingWorld {
    fn player(&mut self) -> &mut dyn Player {
        self
    }

    fn people(&mut self) -> &mut dyn People {
        self
    }

    fn map(&mut self) -> &mut dyn GameMap {
        self
    }

    fn crafting_gui(&mut self) -> Option<&mut dyn CraftingGui> {
        Some(self)
    }

    fn session(&mut self) -> &mut dyn SessionEvents {
        self
    }
}
