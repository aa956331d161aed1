//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Socket settings applied when connecting.
#[derive(Debug, Clone)]
pub struct TcpOptions {
    /// Upper bound for establishing the connection, per resolved address.
    pub connect_timeout: Duration,
    /// Size of the buffer handed to each socket read.
    pub read_buffer_size: usize,
    /// Disable Nagle's algorithm. Commands are small and latency matters.
    pub nodelay: bool,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_buffer_size: 8 * 1024,
            nodelay: true,
        }
    }
}

/// A TCP connection to the game server.
///
/// The stream is split into its read and write halves, each behind its own
/// lock, so the receive loop and the send path never contend. A half is
/// `None` once [`release`](TcpConnection::release) has dropped it.
pub struct TcpConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    read_buffer_size: usize,
}

impl TcpConnection {
    /// Resolves `host` and connects to the first address that accepts.
    ///
    /// # Errors
    /// - [`TransportError::Resolve`] if the name does not resolve
    /// - [`TransportError::ConnectTimeout`] / [`TransportError::ConnectFailed`]
    ///   if no resolved address could be reached
    pub async fn connect(
        host: &str,
        port: u16,
        options: &TcpOptions,
    ) -> Result<Self, TransportError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                host: host.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no addresses",
                ),
            });
        }

        let mut last_error = None;
        for addr in addrs {
            match tokio::time::timeout(
                options.connect_timeout,
                TcpStream::connect(addr),
            )
            .await
            {
                Ok(Ok(stream)) => return Self::from_stream(stream, options),
                Ok(Err(source)) => {
                    tracing::debug!(%addr, error = %source, "connect attempt failed");
                    last_error = Some(TransportError::ConnectFailed {
                        addr: addr.to_string(),
                        source,
                    });
                }
                Err(_) => {
                    tracing::debug!(%addr, "connect attempt timed out");
                    last_error = Some(TransportError::ConnectTimeout {
                        addr,
                        timeout: options.connect_timeout,
                    });
                }
            }
        }

        // `addrs` was non-empty, so at least one attempt recorded an error.
        Err(last_error.unwrap_or_else(|| TransportError::ConnectFailed {
            addr: format!("{host}:{port}"),
            source: std::io::Error::from(std::io::ErrorKind::NotConnected),
        }))
    }

    /// Wraps an already connected stream.
    pub fn from_stream(
        stream: TcpStream,
        options: &TcpOptions,
    ) -> Result<Self, TransportError> {
        let peer = stream.peer_addr().map_err(|source| {
            TransportError::ConnectFailed {
                addr: "<unknown>".into(),
                source,
            }
        })?;
        if options.nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(%peer, error = %e, "could not set TCP_NODELAY");
            }
        }

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "TCP connection established");

        let (reader, writer) = stream.into_split();
        Ok(Self {
            id,
            peer,
            reader: Mutex::new(Some(reader)),
            writer: Mutex::new(Some(writer)),
            read_buffer_size: options.read_buffer_size.max(1),
        })
    }

    /// The address of the server this connection talks to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Shuts down the write direction and drops both halves, which closes
    /// the socket. Afterwards `recv` reports end of stream and `send` fails
    /// with `NotConnected`.
    ///
    /// Waits for the read lock, so it must be called from the task that
    /// reads (or when nobody is parked in `recv`).
    pub async fn release(&self) -> Result<(), TransportError> {
        let writer = self.writer.lock().await.take();
        let shutdown = match writer {
            Some(mut w) => w.shutdown().await.map_err(TransportError::SendFailed),
            None => Ok(()),
        };
        self.reader.lock().await.take();
        tracing::debug!(id = %self.id, peer = %self.peer, "TCP connection released");
        shutdown
    }
}

fn not_connected() -> std::io::Error {
    std::io::Error::from(std::io::ErrorKind::NotConnected)
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| TransportError::SendFailed(not_connected()))?;
        writer
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut guard = self.reader.lock().await;
        let Some(reader) = guard.as_mut() else {
            return Ok(None);
        };
        let mut buf = vec![0u8; self.read_buffer_size];
        let n = reader
            .read(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        match self.writer.lock().await.as_mut() {
            Some(writer) => writer.shutdown().await.map_err(TransportError::SendFailed),
            None => Ok(()),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
