//! Storage — key/value backends and per-entity repositories.
//!
//! ARCHITECTURE
//! ============
//! Each feature area persists one JSON document under its own key, the way
//! the portal front end used browser local storage. `KeyValueStore` is the
//! backend seam (memory, JSON files, Postgres); `JsonRepository<T>` is the
//! typed view of one key with built-in defaults; `SessionRepository` keeps
//! signed-in profiles under per-session keys.
//!
//! TRADE-OFFS
//! ==========
//! Writes are last-write-wins across processes. Within one process,
//! `JsonRepository::update` serializes read-modify-write cycles per key so
//! concurrent requests do not drop each other's changes.

pub mod file;
pub mod memory;
pub mod postgres;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::ErrorCode;
use crate::models::{Conversation, Register, SchoolEvent, UserProfile};
use crate::seed;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

// =============================================================================
// KEYS
// =============================================================================

pub const CURRENT_USER_KEY: &str = "nexlink_current_user";
pub const ATTENDANCE_KEY: &str = "nexlink_temp_register";
pub const EVENTS_KEY: &str = "nexlink_events";
pub const CONVERSATIONS_KEY: &str = "nexlink_conversations";
pub const DIRECTORY_KEY: &str = "nexlink_users";

const SESSION_KEY_LEN: usize = 64;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "E_STORE_IO",
            Self::Db(_) => "E_STORE_DB",
            Self::Serialize(_) => "E_STORE_SERIALIZE",
            Self::InvalidKey(_) => "E_STORE_KEY",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Db(_))
    }
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// A JSON document store addressed by string keys.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document under `key`. Absent keys yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Replace the document under `key`.
    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

// =============================================================================
// TYPED REPOSITORY
// =============================================================================

/// Typed access to one stored document, falling back to built-in defaults
/// when the key is absent or its content no longer matches the shape.
pub struct JsonRepository<T> {
    store: SharedStore,
    key: &'static str,
    defaults: fn() -> T,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(store: SharedStore, key: &'static str, defaults: fn() -> T) -> Self {
        Self { store, key, defaults, write_lock: Mutex::new(()), _marker: PhantomData }
    }

    /// Load the current document.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backend itself fails.
    pub async fn load(&self) -> Result<T, StoreError> {
        let Some(value) = self.store.get(self.key).await? else {
            return Ok((self.defaults)());
        };
        match serde_json::from_value(value) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(key = self.key, error = %e, "stored document malformed — using defaults");
                Ok((self.defaults)())
            }
        }
    }

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub async fn save(&self, doc: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(doc)?;
        self.store.put(self.key, value).await
    }

    /// Drop the stored document so the next load yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    #[cfg(test)]
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.key).await
    }

    /// Read-modify-write under the repository lock. The document is saved
    /// only when `apply` succeeds.
    ///
    /// # Errors
    ///
    /// Propagates `apply`'s error, or the store error converted into `E`.
    pub async fn update<R, E>(&self, apply: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let out = apply(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Signed-in profiles keyed by session key. The stored profile is the whole
/// session: no token, no expiry.
///
/// Keys are 64 hex characters. Anything else comes
/// from a stale or forged cookie and never reaches the backend: reads see no
/// session and removes do nothing.
pub struct SessionRepository {
    store: SharedStore,
}

impl SessionRepository {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn key_for(session_key: &str) -> String {
        format!("{CURRENT_USER_KEY}:{session_key}")
    }

    fn is_session_key(session_key: &str) -> bool {
        session_key.len() == SESSION_KEY_LEN && session_key.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub async fn get(&self, session_key: &str) -> Result<Option<UserProfile>, StoreError> {
        if !Self::is_session_key(session_key) {
            return Ok(None);
        }
        let Some(value) = self.store.get(&Self::key_for(session_key)).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "stored session profile malformed — treating as signed out");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] for a malformed session key, or an
    /// error if serialization or the backend write fails.
    pub async fn put(&self, session_key: &str, profile: &UserProfile) -> Result<(), StoreError> {
        if !Self::is_session_key(session_key) {
            return Err(StoreError::InvalidKey(session_key.to_owned()));
        }
        let value = serde_json::to_value(profile)?;
        self.store.put(&Self::key_for(session_key), value).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend delete fails.
    pub async fn remove(&self, session_key: &str) -> Result<(), StoreError> {
        if !Self::is_session_key(session_key) {
            return Ok(());
        }
        self.store.remove(&Self::key_for(session_key)).await
    }
}

// =============================================================================
// REPOSITORY SET
// =============================================================================

/// One repository per entity, all over the same backend.
pub struct Repositories {
    pub sessions: SessionRepository,
    pub directory: JsonRepository<Vec<UserProfile>>,
    pub events: JsonRepository<Vec<SchoolEvent>>,
    pub conversations: JsonRepository<Vec<Conversation>>,
    pub attendance: JsonRepository<Register>,
}

impl Repositories {
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: SessionRepository::new(Arc::clone(&store)),
            directory: JsonRepository::new(Arc::clone(&store), DIRECTORY_KEY, seed::default_directory),
            events: JsonRepository::new(Arc::clone(&store), EVENTS_KEY, seed::default_events),
            conversations: JsonRepository::new(Arc::clone(&store), CONVERSATIONS_KEY, seed::default_conversations),
            attendance: JsonRepository::new(store, ATTENDANCE_KEY, seed::default_register),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
