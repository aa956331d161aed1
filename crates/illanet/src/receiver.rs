//! Receive loop: socket bytes in, decoded messages out.
//!
//! The loop runs on its own task and only ever blocks on the socket. Every
//! chunk is appended to a [`FrameDecoder`], which splits off as many whole
//! frames as the buffer holds:
//!
//! - a short frame stays buffered until the next chunk arrives,
//! - a malformed frame is logged and skipped (its bytes are known),
//! - an unknown command id ends the connection, since nothing after it can
//!   be framed.
//!
//! Decoded messages go to the main loop through an unbounded channel.

use std::fmt;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use illanet_protocol::{ProtocolError, Registry, ServerMessage};
use illanet_transport::{Connection, TcpConnection};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Why the connection went away without the client asking for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LossReason {
    /// The server closed the socket.
    ClosedByServer,
    /// Reading from the socket failed.
    Io(String),
    /// The stream could not be framed any more, e.g. after an unknown
    /// command id.
    Desync(ProtocolError),
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClosedByServer => write!(f, "closed by server"),
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Desync(e) => write!(f, "stream out of sync: {e}"),
        }
    }
}

/// Connection events surfaced to the main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    ConnectionLost(LossReason),
}

/// What the receive task hands to the client.
#[derive(Debug)]
pub(crate) enum Inbound {
    Message(ServerMessage),
    Lost(LossReason),
}

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Buffers stream bytes and cuts them into messages.
pub struct FrameDecoder {
    registry: Arc<Registry>,
    buffer: BytesMut,
    skipped: u64,
}

impl FrameDecoder {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            buffer: BytesMut::with_capacity(4096),
            skipped: 0,
        }
    }

    /// Appends a chunk read from the socket.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Malformed frames skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Takes the next complete message off the buffer.
    ///
    /// Returns `Ok(None)` when the buffer holds no complete frame. Malformed
    /// frames are dropped on the way.
    ///
    /// # Errors
    /// [`ProtocolError::UnknownCommand`] if the next frame's id is not
    /// registered. The buffer is left as it was; the stream is unusable.
    pub fn next_message(&mut self) -> Result<Option<ServerMessage>, ProtocolError> {
        loop {
            let frame = match self.registry.decode_frame(&self.buffer) {
                Ok(frame) => frame,
                Err(e) if e.is_incomplete() => {
                    if !self.buffer.is_empty() {
                        trace!(buffered = self.buffer.len(), error = %e, "waiting for more data");
                    }
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };

            self.buffer.advance(frame.consumed);
            match frame.outcome {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => {
                    self.skipped += 1;
                    warn!(
                        command = format_args!("0x{:02X}", frame.command),
                        consumed = frame.consumed,
                        error = %e,
                        "skipping malformed message"
                    );
                }
            }
        }
    }
}

impl fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("buffered", &self.buffer.len())
            .field("skipped", &self.skipped)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

/// Reads from `conn` until the stream ends or breaks, forwarding every
/// decoded message. Returns why it stopped, or `None` if the client went
/// away and nobody is listening any more.
pub(crate) async fn receive_loop(
    conn: Arc<TcpConnection>,
    mut decoder: FrameDecoder,
    tx: &mpsc::UnboundedSender<Inbound>,
) -> Option<LossReason> {
    let conn_id = conn.id();
    debug!(%conn_id, "receive loop started");

    loop {
        let chunk = match conn.recv().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                debug!(%conn_id, "server closed the connection");
                return Some(LossReason::ClosedByServer);
            }
            Err(e) => {
                debug!(%conn_id, error = %e, "recv error");
                return Some(LossReason::Io(e.to_string()));
            }
        };
        decoder.extend(&chunk);

        loop {
            match decoder.next_message() {
                Ok(Some(msg)) => {
                    trace!(%conn_id, %msg, "message received");
                    if tx.send(Inbound::Message(msg)).is_err() {
                        return None;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!(%conn_id, error = %e, buffered = decoder.buffered(), "stream out of sync, closing");
                    if let Err(close_err) = conn.release().await {
                        debug!(%conn_id, error = %close_err, "release after desync failed");
                    }
                    return Some(LossReason::Desync(e));
                }
            }
        }
    }
}

/// Spawns the receive loop and reports its end on the same channel.
pub(crate) fn spawn(
    conn: Arc<TcpConnection>,
    decoder: FrameDecoder,
    tx: mpsc::UnboundedSender<Inbound>,
    on_lost: impl FnOnce() + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(reason) = receive_loop(conn, decoder, &tx).await {
            on_lost();
            let _ = tx.send(Inbound::Lost(reason));
        }
    })
}
