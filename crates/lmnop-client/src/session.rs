//! Persistent session state.
//!
//! A session is two independent string entries: the serialized [`Identity`]
//! under [`keys::USER`] and the bearer credential under [`keys::TOKEN`]. A
//! session only counts as active when both are present, the identity parses,
//! and the token is non-empty. Anything else reads as logged-out.
//!
//! Storage backends implement [`Storage`]. Reads never fail; writes go through
//! a single batch so both entries change together.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::{LmsError, Result};
use crate::models::{Identity, Role};

/// Stable storage keys.
pub mod keys {
    /// Serialized identity JSON.
    pub const USER: &str = "user";

    /// Bearer credential.
    pub const TOKEN: &str = "token";
}

// ============================================================================
// Storage backends
// ============================================================================

/// A persistent string key/value store.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Returns the value stored under `key`, or `None` if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Applies all entries in one step. `None` removes the key.
    fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<()>;
}

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut map, entries);
        Ok(())
    }
}

/// Storage kept in a single JSON object file.
///
/// Updates are written to a sibling temporary file and renamed over the
/// target. A missing or corrupt file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "Session file unreadable");
                }
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Session file corrupted, ignoring");
            BTreeMap::new()
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let location = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LmsError::session_storage(&location, e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(map)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, contents)
            .map_err(|e| LmsError::session_storage(&location, e.to_string()))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| LmsError::session_storage(&location, e.to_string()))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_map().remove(key)
    }

    fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map();
        apply(&mut map, entries);
        self.write_map(&map)
    }
}

fn apply(map: &mut BTreeMap<String, String>, entries: &[(&str, Option<&str>)]) {
    for (key, value) in entries {
        match value {
            Some(value) => {
                map.insert((*key).to_string(), (*value).to_string());
            }
            None => {
                map.remove(*key);
            }
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// An authenticated session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Who is logged in.
    pub identity: Identity,
    /// Opaque bearer token.
    pub credential: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Shared handle on the persisted session.
///
/// Cloning is cheap; all clones see the same storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Creates a store backed by [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persists both entries in one write.
    pub fn save(&self, identity: &Identity, credential: &str) -> Result<()> {
        let user = serde_json::to_string(identity)?;
        self.storage.write(&[
            (keys::USER, Some(user.as_str())),
            (keys::TOKEN, Some(credential)),
        ])?;
        debug!(email = %identity.email, role = %identity.role, "Session saved");
        Ok(())
    }

    /// Returns the session if both entries are present and valid.
    pub fn load(&self) -> Option<Session> {
        let credential = self.storage.get(keys::TOKEN).filter(|t| !t.is_empty())?;
        let user = self.storage.get(keys::USER)?;
        match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => Some(Session {
                identity,
                credential,
            }),
            Err(e) => {
                debug!(error = %e, "Stored identity unparsable, treating as logged out");
                None
            }
        }
    }

    /// Removes both entries. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        self.storage
            .write(&[(keys::USER, None), (keys::TOKEN, None)])?;
        debug!("Session cleared");
        Ok(())
    }

    /// Returns `true` iff [`SessionStore::load`] yields a session.
    pub fn is_active(&self) -> bool {
        self.load().is_some()
    }

    /// The logged-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.load().map(|session| session.identity)
    }

    /// The active bearer credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.load().map(|session| session.credential)
    }

    /// Returns `true` if a session is active with exactly this role.
    pub fn has_role(&self, role: Role) -> bool {
        self.identity().is_some_and(|identity| identity.role == role)
    }

    /// The underlying storage backend.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}
