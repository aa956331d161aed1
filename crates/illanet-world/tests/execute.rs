//! Integration tests for message execution against a recording world.

use std::collections::HashMap;
use std::time::Duration;

use illanet_protocol::{
    CharacterId, DialogSlot, DisconnectMsg, GemLevels, Location, LookAtDialogItemMsg, MoveMode,
    MoveMsg, Rareness, RemoveItemMsg, ServerMessage, Tooltip,
};
use illanet_tick::{ExecutionQueue, Progress, RetryOrder, RetryPolicy};
use illanet_world::{
    CharMovementMode, Character, CraftingGui, GameMap, MapTile, MovementHandler, People, Player,
    SessionEvents, World, execute,
};

// =========================================================================
// Recording world
// =========================================================================

const PLAYER: CharacterId = CharacterId(1);
const OTHER: CharacterId = CharacterId(2);

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ServerMove(CharMovementMode, Location, Duration),
    TooEarly,
    Remove(CharacterId),
    SetLocation(CharacterId, Location),
    MoveTo(CharacterId, Location, CharMovementMode, Duration),
    RemoveTopItem(Location),
    SetCost(Location, i32),
    ItemTooltip(i32, u8),
    IngredientTooltip(i32, u8, u8),
    Disconnect(u8),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

struct MockPlayer {
    rec: Recorder,
    screen_radius: i32,
}

impl MovementHandler for Recorder {
    fn execute_server_move(&mut self, mode: CharMovementMode, target: Location, duration: Duration) {
        self.calls.push(Call::ServerMove(mode, target, duration));
    }

    fn execute_server_move_too_early(&mut self) {
        self.calls.push(Call::TooEarly);
    }
}

impl Player for MockPlayer {
    fn is_player(&self, id: CharacterId) -> bool {
        id == PLAYER
    }

    fn is_on_screen(&self, location: Location, tolerance: i32) -> bool {
        location.plane_distance(&Location::default()) <= self.screen_radius + tolerance
    }

    fn movement(&mut self) -> &mut dyn MovementHandler {
        &mut self.rec
    }
}

struct MockChar {
    id: CharacterId,
    calls: Vec<Call>,
}

impl Character for MockChar {
    fn set_location(&mut self, location: Location) {
        self.calls.push(Call::SetLocation(self.id, location));
    }

    fn move_to(&mut self, location: Location, mode: CharMovementMode, duration: Duration) {
        self.calls.push(Call::MoveTo(self.id, location, mode, duration));
    }
}

#[derive(Default)]
struct MockPeople {
    chars: HashMap<CharacterId, MockChar>,
    removed: Vec<Call>,
}

impl People for MockPeople {
    fn remove_character(&mut self, id: CharacterId) {
        self.chars.remove(&id);
        self.removed.push(Call::Remove(id));
    }

    fn access_character(&mut self, id: CharacterId) -> &mut dyn Character {
        self.chars.entry(id).or_insert_with(|| MockChar {
            id,
            calls: Vec::new(),
        })
    }
}

struct MockTile {
    loc: Location,
    calls: Vec<Call>,
}

impl MapTile for MockTile {
    fn remove_top_item(&mut self) {
        self.calls.push(Call::RemoveTopItem(self.loc));
    }

    fn set_movement_cost(&mut self, cost: i32) {
        self.calls.push(Call::SetCost(self.loc, cost));
    }
}

#[derive(Default)]
struct MockMap {
    tiles: HashMap<Location, MockTile>,
}

impl GameMap for MockMap {
    fn tile_at(&mut self, location: Location) -> Option<&mut dyn MapTile> {
        self.tiles
            .get_mut(&location)
            .map(|t| t as &mut dyn MapTile)
    }
}

impl CraftingGui for Recorder {
    fn show_craft_item_tooltip(&mut self, dialog_id: i32, slot: u8, _tooltip: &Tooltip) {
        self.calls.push(Call::ItemTooltip(dialog_id, slot));
    }

    fn show_craft_ingredient_tooltip(
        &mut self,
        dialog_id: i32,
        slot: u8,
        ingredient: u8,
        _tooltip: &Tooltip,
    ) {
        self.calls
            .push(Call::IngredientTooltip(dialog_id, slot, ingredient));
    }
}

impl SessionEvents for Recorder {
    fn server_disconnect(&mut self, reason: u8) {
        self.calls.push(Call::Disconnect(reason));
    }
}

struct MockWorld {
    player: MockPlayer,
    people: MockPeople,
    map: MockMap,
    crafting: Option<Recorder>,
    session: Recorder,
}

impl MockWorld {
    fn new() -> Self {
        Self {
            player: MockPlayer {
                rec: Recorder::default(),
                screen_radius: 10,
            },
            people: MockPeople::default(),
            map: MockMap::default(),
            crafting: None,
            session: Recorder::default(),
        }
    }

    fn with_tile(mut self, loc: Location) -> Self {
        self.map.tiles.insert(
            loc,
            MockTile {
                loc,
                calls: Vec::new(),
            },
        );
        self
    }

    fn char_calls(&self, id: CharacterId) -> Vec<Call> {
        self.people
            .chars
            .get(&id)
            .map(|c| c.calls.clone())
            .unwrap_or_default()
    }

    /// Every mutation made to anything but the local player's movement.
    fn world_mutations(&self) -> usize {
        self.people.removed.len()
            + self.people.chars.values().map(|c| c.calls.len()).sum::<usize>()
            + self.map.tiles.values().map(|t| t.calls.len()).sum::<usize>()
    }
}

impl World for MockWorld {
    fn player(&mut self) -> &mut dyn Player {
        &mut self.player
    }

    fn people(&mut self) -> &mut dyn People {
        &mut self.people
    }

    fn map(&mut self) -> &mut dyn GameMap {
        &mut self.map
    }

    fn crafting_gui(&mut self) -> Option<&mut dyn CraftingGui> {
        self.crafting.as_mut().map(|g| g as &mut dyn CraftingGui)
    }

    fn session(&mut self) -> &mut dyn SessionEvents {
        &mut self.session
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn mv(character: CharacterId, location: Location, mode: MoveMode) -> ServerMessage {
    ServerMessage::Move(MoveMsg {
        character,
        location,
        mode,
        duration_ms: 300,
    })
}

fn tooltip() -> Tooltip {
    Tooltip {
        name: "Bread".into(),
        rareness: Rareness::Common,
        description: String::new(),
        crafted_by: String::new(),
        item_type: "food".into(),
        level: 0,
        usable: true,
        weight: 10,
        worth: 5,
        quality_text: String::new(),
        durability_text: String::new(),
        durability: 99,
        gems: GemLevels::default(),
        bonus: 0,
    }
}

fn lookat(target: DialogSlot) -> ServerMessage {
    ServerMessage::LookAtDialogItem(LookAtDialogItemMsg {
        dialog_id: 12,
        target,
        tooltip: tooltip(),
    })
}

// =========================================================================
// Move
// =========================================================================

#[test]
fn test_execute_move_player_forwards_to_movement_handler() {
    let mut world = MockWorld::new();
    let target = Location::new(3, 3, 0);

    for (mode, expected) in [
        (MoveMode::Move, CharMovementMode::Walk),
        (MoveMode::Run, CharMovementMode::Run),
        (MoveMode::Push, CharMovementMode::Push),
        (MoveMode::NoMove, CharMovementMode::None),
    ] {
        assert_eq!(execute(&mv(PLAYER, target, mode), &mut world), Progress::Complete);
        assert_eq!(
            world.player.rec.calls.last(),
            Some(&Call::ServerMove(expected, target, Duration::from_millis(300)))
        );
    }
    assert_eq!(world.world_mutations(), 0);
}

#[test]
fn test_execute_move_too_early_for_player_runs_once() {
    let mut world = MockWorld::new();

    let progress = execute(&mv(PLAYER, Location::new(1, 0, 0), MoveMode::TooEarly), &mut world);

    assert_eq!(progress, Progress::Complete);
    assert_eq!(world.player.rec.calls, vec![Call::TooEarly]);
}

#[test]
fn test_execute_move_too_early_for_other_is_rejected() {
    let mut world = MockWorld::new();

    let progress = execute(&mv(OTHER, Location::new(1, 0, 0), MoveMode::TooEarly), &mut world);

    assert_eq!(progress, Progress::Dropped);
    assert!(world.player.rec.calls.is_empty());
    assert_eq!(world.world_mutations(), 0);
    assert!(world.people.chars.is_empty(), "no character may be created");
}

#[test]
fn test_execute_move_offscreen_removes_character() {
    let mut world = MockWorld::new();
    // Radius 10 plus tolerance 1: 12 tiles away is out of sight.
    let far = Location::new(12, 0, 0);

    execute(&mv(OTHER, far, MoveMode::Move), &mut world);

    assert_eq!(world.people.removed, vec![Call::Remove(OTHER)]);
    assert!(world.char_calls(OTHER).is_empty());
}

#[test]
fn test_execute_move_at_tolerance_edge_animates() {
    let mut world = MockWorld::new();
    let edge = Location::new(11, 0, 0);

    execute(&mv(OTHER, edge, MoveMode::Move), &mut world);

    assert!(world.people.removed.is_empty());
    assert_eq!(
        world.char_calls(OTHER),
        vec![Call::MoveTo(OTHER, edge, CharMovementMode::Walk, Duration::from_millis(300))]
    );
}

#[test]
fn test_execute_move_other_character_modes() {
    let mut world = MockWorld::new();
    let to = Location::new(2, 2, 0);

    execute(&mv(OTHER, to, MoveMode::NoMove), &mut world);
    execute(&mv(OTHER, to, MoveMode::Run), &mut world);
    execute(&mv(OTHER, to, MoveMode::Push), &mut world);

    assert_eq!(
        world.char_calls(OTHER),
        vec![
            Call::SetLocation(OTHER, to),
            Call::MoveTo(OTHER, to, CharMovementMode::Run, Duration::from_millis(300)),
            Call::MoveTo(OTHER, to, CharMovementMode::Push, Duration::ZERO),
        ]
    );
}

// =========================================================================
// RemoveItem
// =========================================================================

#[test]
fn test_execute_remove_item_unspecified_cost_is_minus_one() {
    let loc = Location::new(5, 5, 0);
    let mut world = MockWorld::new().with_tile(loc);
    let msg = ServerMessage::RemoveItem(RemoveItemMsg {
        location: loc,
        raw_movement_cost: 255,
    });

    assert_eq!(execute(&msg, &mut world), Progress::Complete);
    assert_eq!(
        world.map.tiles[&loc].calls,
        vec![Call::RemoveTopItem(loc), Call::SetCost(loc, -1)]
    );
}

#[test]
fn test_execute_remove_item_literal_cost() {
    let loc = Location::new(5, 5, 0);
    for raw in [0u8, 1, 42, 254] {
        let mut world = MockWorld::new().with_tile(loc);
        let msg = ServerMessage::RemoveItem(RemoveItemMsg {
            location: loc,
            raw_movement_cost: raw,
        });

        execute(&msg, &mut world);

        assert_eq!(
            world.map.tiles[&loc].calls.last(),
            Some(&Call::SetCost(loc, i32::from(raw)))
        );
    }
}

#[test]
fn test_execute_remove_item_missing_tile_completes() {
    let mut world = MockWorld::new();
    let msg = ServerMessage::RemoveItem(RemoveItemMsg {
        location: Location::new(9, 9, 9),
        raw_movement_cost: 3,
    });

    assert_eq!(execute(&msg, &mut world), Progress::Complete);
    assert_eq!(world.world_mutations(), 0);
}

// =========================================================================
// LookAtDialogItem
// =========================================================================

#[test]
fn test_execute_lookat_without_gui_retries() {
    let mut world = MockWorld::new();
    assert_eq!(
        execute(&lookat(DialogSlot::Item { slot: 1 }), &mut world),
        Progress::Retry
    );
}

#[test]
fn test_execute_lookat_routes_by_slot_kind() {
    let mut world = MockWorld::new();
    world.crafting = Some(Recorder::default());

    execute(&lookat(DialogSlot::Item { slot: 1 }), &mut world);
    execute(
        &lookat(DialogSlot::Ingredient {
            slot: 2,
            ingredient: 3,
        }),
        &mut world,
    );

    assert_eq!(
        world.crafting.unwrap().calls,
        vec![Call::ItemTooltip(12, 1), Call::IngredientTooltip(12, 2, 3)]
    );
}

#[test]
fn test_lookat_waits_in_queue_until_gui_is_ready() {
    let mut world = MockWorld::new();
    let mut queue = ExecutionQueue::new(RetryPolicy::UNLIMITED, RetryOrder::HeadOfLine);
    queue.push(lookat(DialogSlot::Item { slot: 4 }));
    queue.push(ServerMessage::Disconnect(DisconnectMsg { reason: 1 }));

    let first = queue.run_tick(|msg| execute(msg, &mut world));
    assert_eq!(first.retried, 1);
    assert!(world.session.calls.is_empty(), "disconnect must wait its turn");

    world.crafting = Some(Recorder::default());
    let second = queue.run_tick(|msg| execute(msg, &mut world));

    assert_eq!(second.completed, 2);
    assert_eq!(world.crafting.unwrap().calls, vec![Call::ItemTooltip(12, 4)]);
    assert_eq!(world.session.calls, vec![Call::Disconnect(1)]);
}

#[tokio::test(start_paused = true)]
async fn test_lookat_without_gui_is_dropped_under_default_policy() {
    let mut world = MockWorld::new();
    let step = Location::new(1, 0, 0);
    let mut queue = ExecutionQueue::default();
    queue.push(lookat(DialogSlot::Item { slot: 4 }));
    queue.push(mv(OTHER, step, MoveMode::Move));
    queue.push(ServerMessage::Disconnect(DisconnectMsg { reason: 2 }));

    for _ in 0..100 {
        queue.run_tick(|msg| execute(msg, &mut world));
    }
    assert_eq!(queue.len(), 3);
    assert!(world.char_calls(OTHER).is_empty());

    tokio::time::advance(RetryPolicy::DEFAULT_MAX_AGE).await;
    let report = queue.run_tick(|msg| execute(msg, &mut world));

    assert_eq!(report.dropped, 1);
    assert_eq!(report.completed, 2);
    assert!(queue.is_empty());
    assert_eq!(
        world.char_calls(OTHER),
        vec![Call::MoveTo(OTHER, step, CharMovementMode::Walk, Duration::from_millis(300))]
    );
    assert_eq!(world.session.calls, vec![Call::Disconnect(2)]);
}
