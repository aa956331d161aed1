//! Key/value configuration store.
//!
//! The login component persists a handful of values between runs: the last
//! account name, whether to remember the password, the password
//! fingerprint, and the selected server. [`ConfigStore`] is the seam; the
//! client's real configuration system implements it, and this module ships
//! two implementations of its own:
//!
//! - [`MemoryStore`]: nothing touches disk. Tests and throwaway tools.
//! - [`JsonFileStore`]: a flat JSON object in a file, written on `save`.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::SessionError;

/// Config keys the network layer reads or writes.
pub mod keys {
    pub const LAST_LOGIN: &str = "lastLogin";
    pub const SAVE_PASSWORD: &str = "savePassword";
    pub const FINGERPRINT: &str = "fingerprint";
    pub const SERVER: &str = "server";
    pub const CLIENT_VERSION: &str = "clientVersion";
    pub const SERVER_ACCOUNT_LOGIN: &str = "serverAccountLogin";
    pub const LOCALE: &str = "locale";
    /// Host of a player-configured server.
    pub const SERVER_ADDRESS: &str = "serverAddress";
    /// Port of a player-configured server.
    pub const SERVER_PORT: &str = "serverPort";
}

/// A persistent key/value store with JSON values.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<&Value>;

    fn set(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);

    /// Writes pending changes to the backing storage, if there is one.
    fn save(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)?.as_str().map(str::to_owned)
    }

    /// Missing or non-boolean values read as `false`.
    fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store. `save` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Map<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Store backed by a JSON file holding a single flat object.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
    dirty: bool,
}

impl JsonFileStore {
    /// Loads the store from `path`. A missing file yields an empty store;
    /// it is created on the first `save`.
    ///
    /// # Errors
    /// [`SessionError::Io`] if the file exists but cannot be read,
    /// [`SessionError::Json`] if it is not a JSON object.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = values.len(), "config store loaded");
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` if there are changes not yet written by `save`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_owned(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn save(&mut self) -> Result<(), SessionError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)?;
        self.dirty = false;
        debug!(path = %self.path.display(), "config store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_getters_tolerate_wrong_types() {
        let mut store = MemoryStore::new();
        store.set(keys::SAVE_PASSWORD, json!("yes"));
        store.set(keys::SERVER, json!("two"));

        assert!(!store.get_bool(keys::SAVE_PASSWORD));
        assert_eq!(store.get_int(keys::SERVER), None);
        assert_eq!(store.get_string(keys::SERVER).as_deref(), Some("two"));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("illanet.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set(keys::LAST_LOGIN, json!("ada"));
        store.set(keys::SERVER, json!(1));
        assert!(store.is_dirty());
        store.save().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get_string(keys::LAST_LOGIN).as_deref(), Some("ada"));
        assert_eq!(reopened.get_int(keys::SERVER), Some(1));
        assert!(!reopened.is_dirty());
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(SessionError::Json(_))
        ));
    }
}
