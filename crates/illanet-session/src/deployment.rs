//! Server deployments the client can target.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host and port of a game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One logical server the client can log in to.
///
/// The numeric index is what gets persisted under the `server` config key,
/// so the order of variants is part of the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deployment {
    DevServer,
    TestServer,
    RealServer,
    /// A server configured by the player.
    CustomServer,
    /// A server on this machine; no account handling at all.
    LocalServer,
}

impl Deployment {
    pub const ALL: [Deployment; 5] = [
        Self::DevServer,
        Self::TestServer,
        Self::RealServer,
        Self::CustomServer,
        Self::LocalServer,
    ];

    /// Host of the official servers and of the account web service.
    pub const OFFICIAL_HOST: &'static str = "illarion.org";

    pub fn index(self) -> i64 {
        match self {
            Self::DevServer => 0,
            Self::TestServer => 1,
            Self::RealServer => 2,
            Self::CustomServer => 3,
            Self::LocalServer => 4,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.index() == index)
    }

    /// The `server` attribute character-list entries carry for this
    /// deployment. `None` means entries are not filtered at all.
    pub fn charlist_tag(self) -> Option<&'static str> {
        match self {
            Self::DevServer => Some("devserver"),
            Self::TestServer => Some("testserver"),
            Self::RealServer => Some("illarionserver"),
            Self::CustomServer | Self::LocalServer => None,
        }
    }

    /// `true` if a character tagged with `server` belongs in this
    /// deployment's character list.
    pub fn accepts(self, server: &str) -> bool {
        self.charlist_tag().is_none_or(|tag| tag == server)
    }

    /// Where the game server listens. Custom servers are configured by the
    /// player and resolved through the config store instead.
    pub fn default_endpoint(self) -> ServerEndpoint {
        match self {
            Self::DevServer => ServerEndpoint::new(Self::OFFICIAL_HOST, 3012),
            Self::TestServer => ServerEndpoint::new(Self::OFFICIAL_HOST, 3011),
            Self::RealServer => ServerEndpoint::new(Self::OFFICIAL_HOST, 3008),
            Self::CustomServer | Self::LocalServer => ServerEndpoint::new("localhost", 3012),
        }
    }

    /// Protocol version a build for this deployment announces at login.
    pub fn builtin_client_version(self) -> u8 {
        match self {
            Self::DevServer | Self::CustomServer | Self::LocalServer => 200,
            Self::TestServer => 123,
            Self::RealServer => 122,
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DevServer => "devserver",
            Self::TestServer => "testserver",
            Self::RealServer => "realserver",
            Self::CustomServer => "customserver",
            Self::LocalServer => "localserver",
        };
        f.write_str(name)
    }
}
