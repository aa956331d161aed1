//! Unified error type for illanet.

use illanet_protocol::ProtocolError;
use illanet_session::SessionError;
use illanet_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum IllanetError {
    /// A transport-level error (resolve, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, unknown command).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A login-level error (character list, credentials).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command was sent while no connection was open.
    #[error("not connected")]
    NotConnected,
}

impl IllanetError {
    /// `true` for failures to establish a connection: resolution, refusal,
    /// timeout. These are the ones worth retrying.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect_failure())
    }
}
