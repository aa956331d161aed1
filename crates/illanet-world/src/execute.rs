//! Applying decoded messages to the world.

use std::time::Duration;

use illanet_protocol::{
    DialogSlot, LookAtDialogItemMsg, MoveMode, MoveMsg, RemoveItemMsg, ServerMessage,
};
use illanet_tick::Progress;
use tracing::{debug, warn};

use crate::{CharMovementMode, World};

/// Extra tiles around the visible area that still count as on screen when
/// deciding whether a moving character is worth animating.
const ON_SCREEN_TOLERANCE: i32 = 1;

/// Applies one message to `world`.
///
/// Runs on the main loop. Returns [`Progress::Retry`] when the part of the
/// world the message targets does not exist yet; the caller keeps the
/// message queued and calls again on a later tick.
pub fn execute(msg: &ServerMessage, world: &mut dyn World) -> Progress {
    match msg {
        ServerMessage::Move(m) => execute_move(m, world),
        ServerMessage::RemoveItem(m) => execute_remove_item(m, world),
        ServerMessage::LookAtDialogItem(m) => execute_lookat_dialog_item(m, world),
        ServerMessage::Disconnect(m) => {
            debug!(reason = m.reason, "server closed the session");
            world.session().server_disconnect(m.reason);
            Progress::Complete
        }
    }
}

fn execute_move(msg: &MoveMsg, world: &mut dyn World) -> Progress {
    let duration = Duration::from_millis(u64::from(msg.duration_ms));

    let player = world.player();
    if player.is_player(msg.character) {
        let movement = player.movement();
        let mode = match msg.mode {
            MoveMode::TooEarly => {
                movement.execute_server_move_too_early();
                return Progress::Complete;
            }
            MoveMode::Move => CharMovementMode::Walk,
            MoveMode::Push => CharMovementMode::Push,
            MoveMode::Run => CharMovementMode::Run,
            MoveMode::NoMove => CharMovementMode::None,
        };
        movement.execute_server_move(mode, msg.location, duration);
        return Progress::Complete;
    }

    if msg.mode == MoveMode::TooEarly {
        warn!(character = %msg.character, "too-early move for a character other than the player");
        return Progress::Dropped;
    }

    // Out of sight: nothing to animate, just forget the character.
    if !player.is_on_screen(msg.location, ON_SCREEN_TOLERANCE) {
        world.people().remove_character(msg.character);
        return Progress::Complete;
    }

    let character = world.people().access_character(msg.character);
    match msg.mode {
        MoveMode::NoMove => character.set_location(msg.location),
        MoveMode::Move => character.move_to(msg.location, CharMovementMode::Walk, duration),
        MoveMode::Run => character.move_to(msg.location, CharMovementMode::Run, duration),
        MoveMode::Push => character.move_to(msg.location, CharMovementMode::Push, Duration::ZERO),
        MoveMode::TooEarly => return Progress::Dropped,
    }
    Progress::Complete
}

fn execute_remove_item(msg: &RemoveItemMsg, world: &mut dyn World) -> Progress {
    if let Some(tile) = world.map().tile_at(msg.location) {
        tile.remove_top_item();
        tile.set_movement_cost(msg.movement_cost());
    }
    Progress::Complete
}

fn execute_lookat_dialog_item(msg: &LookAtDialogItemMsg, world: &mut dyn World) -> Progress {
    let Some(gui) = world.crafting_gui() else {
        return Progress::Retry;
    };
    match msg.target {
        DialogSlot::Item { slot } => gui.show_craft_item_tooltip(msg.dialog_id, slot, &msg.tooltip),
        DialogSlot::Ingredient { slot, ingredient } => {
            gui.show_craft_ingredient_tooltip(msg.dialog_id, slot, ingredient, &msg.tooltip)
        }
    }
    Progress::Complete
}
