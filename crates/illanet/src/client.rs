//! The network client: one connection, its receive loop, and the queue of
//! messages waiting for the main loop.
//!
//! ```text
//!              ┌──────────── receive task ────────────┐
//!  socket ───► │ recv → FrameDecoder → mpsc::send     │ ──┐
//!              └──────────────────────────────────────┘   │
//!                                                         ▼
//!  main loop ─► NetClient::update(world) → ExecutionQueue::run_tick → execute
//!  main loop ─► NetClient::send_command(cmd) ───────────────────────► socket
//! ```
//!
//! The receive task and the send path use the two halves of the socket, so
//! they never wait on each other. World state is only touched from
//! [`NetClient::update`], on whatever task drives the main loop.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use illanet_protocol::{Command, Registry, ServerMessage};
use illanet_session::{ConfigStore, Login};
use illanet_tick::{ExecutionQueue, TickReport, UpdateClock};
use illanet_transport::{Connection, TcpConnection};
use illanet_world::World;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::receiver::{self, FrameDecoder, Inbound};
use crate::{IllanetError, NetConfig, NetEvent};

/// How long `disconnect` waits for the logoff command to go out.
const LOGOFF_TIMEOUT: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// ConnectionStatus
// ---------------------------------------------------------------------------

/// Where the client's connection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No connection, and none was lost: initial state, or after
    /// [`NetClient::disconnect`].
    Disconnected,
    Connecting,
    Connected,
    /// The last connect attempt failed, or an open connection was lost.
    Failed,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateSummary
// ---------------------------------------------------------------------------

/// What one [`NetClient::update`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Messages taken from the receive loop this update.
    pub received: usize,
    /// Execution counts for this tick.
    pub report: TickReport,
    /// Connection events, in the order they happened.
    pub events: Vec<NetEvent>,
}

// ---------------------------------------------------------------------------
// NetClient
// ---------------------------------------------------------------------------

struct Link {
    conn: Arc<TcpConnection>,
    task: JoinHandle<()>,
}

/// Client side of the game connection.
///
/// Owns at most one connection at a time. Construct one per game session;
/// there is no global instance.
pub struct NetClient {
    config: NetConfig,
    registry: Arc<Registry>,
    status: Arc<watch::Sender<ConnectionStatus>>,
    link: Option<Link>,
    inbound: Option<mpsc::UnboundedReceiver<Inbound>>,
    queue: ExecutionQueue<ServerMessage>,
}

impl NetClient {
    pub fn new(config: NetConfig) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let queue = ExecutionQueue::new(config.retry, config.retry_order);
        Self {
            config,
            registry: Arc::new(Registry::new()),
            status: Arc::new(status),
            link: None,
            inbound: None,
            queue,
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// A receiver that sees every status change, including the ones made
    /// by the receive task when the connection drops.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Address of the server, while connected.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.link.as_ref().map(|link| link.conn.peer_addr())
    }

    /// Messages decoded but not yet applied.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// A clock running at the configured update rate, for hosts that have
    /// no frame loop of their own.
    pub fn update_clock(&self) -> UpdateClock {
        UpdateClock::with_rate(self.config.update_rate_hz)
    }

    // -----------------------------------------------------------------------
    // Connecting
    // -----------------------------------------------------------------------

    /// Connects to the game server.
    ///
    /// Returns `false` if the server could not be reached; the reason is
    /// logged. Use [`try_connect`](Self::try_connect) to get the error.
    pub async fn connect(&mut self, host: &str, port: u16) -> bool {
        match self.try_connect(host, port).await {
            Ok(()) => true,
            Err(e) => {
                error!(host, port, error = %e, "could not connect to the game server");
                false
            }
        }
    }

    /// Connects to the game server, replacing any previous connection.
    ///
    /// # Errors
    /// [`IllanetError::Transport`] if resolution, connecting, or the
    /// connect timeout fails.
    pub async fn try_connect(&mut self, host: &str, port: u16) -> Result<(), IllanetError> {
        if self.link.is_some() || self.inbound.is_some() {
            self.disconnect().await;
        }

        self.status.send_replace(ConnectionStatus::Connecting);
        debug!(host, port, "connecting");

        let conn = match TcpConnection::connect(host, port, &self.config.tcp_options()).await {
            Ok(conn) => Arc::new(conn),
            Err(e) => {
                self.status.send_replace(ConnectionStatus::Failed);
                return Err(e.into());
            }
        };

        info!(conn_id = %conn.id(), peer = %conn.peer_addr(), "connected to game server");
        self.status.send_replace(ConnectionStatus::Connected);

        let (tx, rx) = mpsc::unbounded_channel();
        let decoder = FrameDecoder::new(Arc::clone(&self.registry));
        let status = Arc::clone(&self.status);
        let task = receiver::spawn(Arc::clone(&conn), decoder, tx, move || {
            status.send_replace(ConnectionStatus::Failed);
        });

        self.link = Some(Link { conn, task });
        self.inbound = Some(rx);
        Ok(())
    }

    /// Like [`try_connect`](Self::try_connect), retrying connect failures
    /// under the configured [`ReconnectPolicy`](crate::ReconnectPolicy).
    ///
    /// # Errors
    /// The last connect failure once retries run out, or the first error
    /// that is not a connect failure.
    pub async fn connect_with_retry(&mut self, host: &str, port: u16) -> Result<(), IllanetError> {
        let policy = self.config.reconnect.clone();
        let mut retry = 0;
        loop {
            match self.try_connect(host, port).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_connect_failure() && policy.allows(retry) => {
                    let delay = policy.delay_for(retry);
                    retry += 1;
                    warn!(
                        host,
                        port,
                        retry,
                        max_retries = policy.max_attempts,
                        ?delay,
                        error = %e,
                        "connect failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Closes the connection and discards every message still queued.
    ///
    /// A logoff command is sent first if possible. Calling this while not
    /// connected only clears the queue.
    pub async fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            let conn_id = link.conn.id();
            match Command::Logoff.encode() {
                Ok(frame) => {
                    match tokio::time::timeout(LOGOFF_TIMEOUT, link.conn.send(&frame)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => debug!(%conn_id, error = %e, "logoff not sent"),
                        Err(_) => debug!(%conn_id, "logoff timed out"),
                    }
                }
                Err(e) => debug!(%conn_id, error = %e, "logoff not encoded"),
            }
            if let Err(e) = link.conn.close().await {
                debug!(%conn_id, error = %e, "close failed");
            }
            link.task.abort();
            // Wait for the task so its status update cannot land after ours.
            let _ = link.task.await;
            info!(%conn_id, "disconnected");
        }

        self.inbound = None;
        let discarded = self.queue.clear();
        if discarded > 0 {
            debug!(discarded, "dropped queued messages");
        }
        self.status.send_replace(ConnectionStatus::Disconnected);
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    /// Encodes `command` and writes it to the server.
    ///
    /// Safe to call while the receive loop is reading.
    ///
    /// # Errors
    /// [`IllanetError::NotConnected`] without a connection,
    /// [`IllanetError::Protocol`] if the command cannot be encoded, or
    /// [`IllanetError::Transport`] if the write fails.
    pub async fn send_command(&self, command: &Command) -> Result<(), IllanetError> {
        let conn = self
            .link
            .as_ref()
            .map(|link| Arc::clone(&link.conn))
            .ok_or(IllanetError::NotConnected)?;
        let frame = command.encode()?;
        conn.send(&frame).await?;
        debug!(conn_id = %conn.id(), command = command.name(), bytes = frame.len(), "command sent");
        Ok(())
    }

    /// Connects to the server `login` points at and sends the login command.
    ///
    /// Returns `false` if that failed; the reason is logged. Whether the
    /// server accepted the login shows up later as messages.
    pub async fn login(&mut self, login: &Login, store: &dyn ConfigStore) -> bool {
        match self.try_login(login, store).await {
            Ok(()) => true,
            Err(e) => {
                error!(account = login.account(), error = %e, "login failed");
                false
            }
        }
    }

    /// Like [`login`](Self::login), returning the error.
    pub async fn try_login(&mut self, login: &Login, store: &dyn ConfigStore) -> Result<(), IllanetError> {
        let command = login.login_command(store)?;
        let endpoint = login.endpoint(store);

        self.try_connect(&endpoint.host, endpoint.port).await?;
        self.send_command(&command).await?;

        info!(server = %login.server(), %endpoint, "login sent");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Runs one main-loop tick: takes everything the receive loop decoded
    /// since the last call, then applies queued messages to `world` in
    /// arrival order.
    ///
    /// Messages received before a connection loss are still applied.
    pub fn update(&mut self, world: &mut dyn World) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        self.drain_inbound(&mut summary);
        summary.report = self
            .queue
            .run_tick(|msg| illanet_world::execute(msg, &mut *world));
        summary
    }

    fn drain_inbound(&mut self, summary: &mut UpdateSummary) {
        let Some(rx) = self.inbound.as_mut() else {
            return;
        };

        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(Inbound::Message(msg)) => {
                    self.queue.push(msg);
                    summary.received += 1;
                }
                Ok(Inbound::Lost(reason)) => {
                    warn!(%reason, "connection lost");
                    self.link = None;
                    summary.events.push(NetEvent::ConnectionLost(reason));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }
        if closed {
            self.inbound = None;
        }
    }
}

impl Default for NetClient {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            link.task.abort();
        }
    }
}

impl fmt::Debug for NetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetClient")
            .field("status", &self.status())
            .field("peer", &self.peer_addr())
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}
