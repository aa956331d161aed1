//! Account login state.
//!
//! [`Login`] holds what the login screen collects (account name, password,
//! selected server, chosen character) and everything derived from it: the
//! character list, the client version to announce, and the login command
//! itself. It is an explicit value owned by the caller; nothing here is
//! process-global.
//!
//! Persistence goes through a [`ConfigStore`]. The password is only ever
//! stored as a [`Fingerprint`].

use std::path::PathBuf;

use illanet_protocol::Command;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::store::keys;
use crate::{
    CHARLIST_FETCH_FAILED, CharEntry, CharListDocument, CharListFetcher, CharListOutcome,
    ConfigStore, Deployment, Fingerprint, ServerEndpoint, SessionError,
};

/// Locale values written to the config store.
pub const LOCALE_GERMAN: &str = "de";
pub const LOCALE_ENGLISH: &str = "en";

/// Login data for one client instance.
#[derive(Clone)]
pub struct Login {
    /// The deployment this client was built for.
    build: Deployment,
    /// The deployment the player picked.
    selected: Deployment,
    account: String,
    password: String,
    save_password: bool,
    character: Option<String>,
    characters: Vec<CharEntry>,
    /// Directory whose path keys the password fingerprint.
    user_dir: PathBuf,
}

impl Login {
    /// Creates empty login data for a client built for `build`.
    pub fn new(build: Deployment, user_dir: impl Into<PathBuf>) -> Self {
        Self {
            build,
            selected: build,
            account: String::new(),
            password: String::new(),
            save_password: false,
            character: None,
            characters: Vec::new(),
            user_dir: user_dir.into(),
        }
    }

    pub fn set_login_data(&mut self, account: impl Into<String>, password: impl Into<String>) {
        self.account = account.into();
        self.password = password.into();
    }

    pub fn set_server(&mut self, deployment: Deployment) {
        self.selected = deployment;
    }

    pub fn set_login_character(&mut self, name: impl Into<String>) {
        self.character = Some(name.into());
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn build(&self) -> Deployment {
        self.build
    }

    /// Whether the password was remembered last time.
    pub fn is_password_saved(&self) -> bool {
        self.save_password
    }

    /// The deployment actually in use. A build for the real server always
    /// talks to the real server, whatever was selected.
    pub fn server(&self) -> Deployment {
        if self.build == Deployment::RealServer {
            Deployment::RealServer
        } else {
            self.selected
        }
    }

    /// The characters from the last successful character-list fetch.
    pub fn characters(&self) -> &[CharEntry] {
        &self.characters
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Loads the last login from the store.
    pub fn restore(&mut self, store: &dyn ConfigStore) {
        if let Some(account) = store.get_string(keys::LAST_LOGIN) {
            self.account = account;
        }
        if let Some(fingerprint) = store.get_string(keys::FINGERPRINT) {
            self.password = self.shuffle(&fingerprint, Direction::Decode);
        }
        self.save_password = store.get_bool(keys::SAVE_PASSWORD);
        if let Some(server) = store.get_int(keys::SERVER) {
            self.selected = Deployment::from_index(server).unwrap_or_else(|| {
                warn!(server, "stored server index is unknown, using the dev server");
                Deployment::DevServer
            });
        }
        debug!(account = %self.account, server = %self.server(), "login data restored");
    }

    /// Writes the login to the store and saves it.
    ///
    /// For a local server only the server selection is kept; account data
    /// is not written at all.
    pub fn store(&mut self, store: &mut dyn ConfigStore, save_password: bool) -> Result<(), SessionError> {
        if self.build != Deployment::RealServer {
            store.set(keys::SERVER, Value::from(self.selected.index()));
        }

        if self.server() != Deployment::LocalServer {
            store.set(keys::LAST_LOGIN, Value::from(self.account.as_str()));
            store.set(keys::SAVE_PASSWORD, Value::from(save_password));
            if save_password {
                let fingerprint = self.shuffle(&self.password, Direction::Encode);
                store.set(keys::FINGERPRINT, Value::from(fingerprint));
            } else {
                store.remove(keys::FINGERPRINT);
            }
            self.save_password = save_password;
        }

        store.save()
    }

    fn shuffle(&self, text: &str, direction: Direction) -> String {
        let result = Fingerprint::from_user_dir(&self.user_dir).and_then(|fp| match direction {
            Direction::Encode => fp.encode(text),
            Direction::Decode => fp.decode(text),
        });
        result.unwrap_or_else(|e| {
            warn!(error = %e, ?direction, "password fingerprint failed");
            String::new()
        })
    }

    // -----------------------------------------------------------------------
    // Character list
    // -----------------------------------------------------------------------

    /// Whether the player has to pick a character from the account's list
    /// before logging in.
    pub fn is_character_list_required(&self, store: &dyn ConfigStore) -> bool {
        match self.server() {
            Deployment::LocalServer => false,
            Deployment::CustomServer => store.get_bool(keys::SERVER_ACCOUNT_LOGIN),
            _ => true,
        }
    }

    /// Starts fetching the character list in the background.
    ///
    /// Apply the outcome with [`apply_charlist`](Self::apply_charlist) once
    /// it arrives.
    pub fn request_character_list(&self, fetcher: &CharListFetcher) -> oneshot::Receiver<CharListOutcome> {
        fetcher.spawn(self.account.clone(), self.password.clone())
    }

    /// Applies a fetch outcome and returns its result code.
    ///
    /// `0` means the character list was replaced. Any other code leaves the
    /// previous list untouched.
    pub fn apply_charlist(&mut self, outcome: CharListOutcome, store: &mut dyn ConfigStore) -> i32 {
        match outcome {
            CharListOutcome::Loaded(doc) => self.apply_charlist_document(doc, store),
            CharListOutcome::Failed(reason) => {
                debug!(%reason, "character list unavailable");
                CHARLIST_FETCH_FAILED
            }
        }
    }

    /// Applies a parsed character-list document and returns its result code.
    pub fn apply_charlist_document(&mut self, doc: CharListDocument, store: &mut dyn ConfigStore) -> i32 {
        match doc {
            CharListDocument::Error { code } => {
                info!(code, "account service reported an error");
                code
            }
            CharListDocument::Characters { lang, characters } => {
                match lang.as_deref() {
                    Some("de") => store.set(keys::LOCALE, Value::from(LOCALE_GERMAN)),
                    Some("us") => store.set(keys::LOCALE, Value::from(LOCALE_ENGLISH)),
                    _ => {}
                }

                let server = self.server();
                let listed = characters.len();
                self.characters = characters
                    .into_iter()
                    .filter(|c| server.accepts(&c.server))
                    .map(|c| CharEntry {
                        name: c.name,
                        status: c.status,
                    })
                    .collect();
                debug!(listed, kept = self.characters.len(), %server, "character list updated");
                0
            }
        }
    }

    // -----------------------------------------------------------------------
    // Game login
    // -----------------------------------------------------------------------

    /// The character to log in with. Without a character list that is the
    /// account name itself.
    pub fn login_character(&self, store: &dyn ConfigStore) -> Option<&str> {
        if self.is_character_list_required(store) {
            self.character.as_deref()
        } else {
            Some(&self.account)
        }
    }

    /// Protocol version to announce. Builds for the real server always use
    /// their built-in version; other builds honour `clientVersion`.
    pub fn client_version(&self, store: &dyn ConfigStore) -> u8 {
        if self.build == Deployment::RealServer {
            return self.build.builtin_client_version();
        }
        store
            .get_int(keys::CLIENT_VERSION)
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or_else(|| self.build.builtin_client_version())
    }

    /// Game server address for the deployment in use.
    pub fn endpoint(&self, store: &dyn ConfigStore) -> ServerEndpoint {
        let server = self.server();
        let mut endpoint = server.default_endpoint();
        if server == Deployment::CustomServer {
            if let Some(host) = store.get_string(keys::SERVER_ADDRESS) {
                endpoint.host = host;
            }
            if let Some(port) = store.get_int(keys::SERVER_PORT).and_then(|p| u16::try_from(p).ok()) {
                endpoint.port = port;
            }
        }
        endpoint
    }

    /// Builds the login command.
    ///
    /// # Errors
    /// [`SessionError::NoCharacter`] if a character list is required and no
    /// character has been chosen.
    pub fn login_command(&self, store: &dyn ConfigStore) -> Result<Command, SessionError> {
        let character = self.login_character(store).ok_or(SessionError::NoCharacter)?;
        Ok(Command::Login {
            character: character.to_owned(),
            password: self.password.clone(),
            client_version: self.client_version(store),
        })
    }
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("build", &self.build)
            .field("selected", &self.selected)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("character", &self.character)
            .field("characters", &self.characters.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Encode,
    Decode,
}
