//! # illanet
//!
//! Client network layer for the Illarion game protocol.
//!
//! illanet connects to a game server, turns the byte stream into typed
//! messages, and applies them to the game world on the caller's main loop.
//! The game itself only implements the small collaborator traits in
//! [`world`]; everything between the socket and those traits lives here.
//!
//! ## Layers
//!
//! | Crate | Role |
//! |-------|------|
//! | `illanet-transport` | TCP connection |
//! | `illanet-protocol` | wire primitives, messages, commands, registry |
//! | `illanet-tick` | main-loop execution queue and update clock |
//! | `illanet-world` | world collaborator traits and per-message execution |
//! | `illanet-session` | account login, character list, stored credentials |
//! | `illanet` (this crate) | [`NetClient`]: connection, receive loop, queue |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use illanet::prelude::*;
//!
//! # async fn run(world: &mut dyn World) {
//! let mut client = NetClient::new(NetConfig::default());
//! if !client.connect("localhost", 3012).await {
//!     return;
//! }
//! let mut clock = client.update_clock();
//! loop {
//!     clock.wait_for_tick().await;
//!     let summary = client.update(world);
//!     if !summary.events.is_empty() {
//!         break;
//!     }
//! }
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod logging;
mod receiver;
mod reconnect;

pub use client::{ConnectionStatus, NetClient, UpdateSummary};
pub use config::NetConfig;
pub use error::IllanetError;
pub use receiver::{FrameDecoder, LossReason, NetEvent};
pub use reconnect::ReconnectPolicy;

pub use illanet_protocol as protocol;
pub use illanet_session as session;
pub use illanet_tick as tick;
pub use illanet_transport as transport;
pub use illanet_world as world;

/// Convenient re-exports for the common case.
///
/// ```rust
/// use illanet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ConnectionStatus, IllanetError, LossReason, NetClient, NetConfig, NetEvent,
        ReconnectPolicy, UpdateSummary,
    };

    pub use illanet_protocol::{
        CharacterId, Command, Location, ProtocolError, Registry, ServerMessage, Tooltip,
    };
    pub use illanet_session::{
        CharListFetcher, CharListOutcome, ConfigStore, Deployment, JsonFileStore, Login,
        MemoryStore, SessionError,
    };
    pub use illanet_tick::{ExecutionQueue, Progress, RetryOrder, RetryPolicy, TickReport, UpdateClock};
    pub use illanet_transport::TransportError;
    pub use illanet_world::{
        CharMovementMode, Character, CraftingGui, GameMap, MapTile, MovementHandler, People,
        Player, SessionEvents, World,
    };
}
