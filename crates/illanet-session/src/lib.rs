//! Account login for illanet.
//!
//! Everything that happens before and around the game connection's login
//! command:
//!
//! 1. **Deployments** ([`Deployment`]): which server the client targets,
//!    and what that implies for hosts, versions and character filtering.
//! 2. **Character list** ([`CharListFetcher`], [`parse_charlist`]): an
//!    HTTPS request to the account service, separate from the binary
//!    protocol, that runs in the background.
//! 3. **Credentials** ([`Login`], [`ConfigStore`], [`Fingerprint`]): the
//!    login screen's data, persisted between runs.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client layer (above)  ← connects, then sends Login::login_command()
//!     ↕
//! Session layer (this crate)  ← account, password, character, server
//!     ↕
//! Protocol layer (below)  ← provides the Command type
//! ```

mod charlist;
mod deployment;
mod error;
mod fetch;
mod fingerprint;
mod login;
pub mod store;

pub use charlist::{CharEntry, CharListDocument, ListedCharacter, parse_charlist};
pub use deployment::{Deployment, ServerEndpoint};
pub use error::SessionError;
pub use fetch::{CHARLIST_FETCH_FAILED, CHARLIST_PATH, CharListFetcher, CharListOutcome};
pub use fingerprint::Fingerprint;
pub use login::{LOCALE_ENGLISH, LOCALE_GERMAN, Login};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
