//! Registry of live sessions.
//!
//! Each session owns exactly one [`AssignmentMemory`] behind its own mutex,
//! so concurrent requests for the same session are serialized while
//! different sessions never contend on each other's bindings.

use crate::error::Result;
use crate::session::AssignmentMemory;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Handle to one session's memory.
pub type SharedMemory = Arc<Mutex<AssignmentMemory>>;

/// Maps session identifiers to their memories.
///
/// # Examples
///
/// ```
/// use mathgate::session::SessionStore;
///
/// let store = SessionStore::new();
/// store.with_session("alice", |memory| memory.process("a = 1")).unwrap();
/// let bound = store.with_session("alice", |memory| memory.process("a")).unwrap();
/// assert_eq!(bound, "1");
/// ```
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedMemory>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memory for `id`, creating an empty one on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Internal`] if the registry lock is poisoned.
    pub fn open(&self, id: &str) -> Result<SharedMemory> {
        let mut sessions = self.sessions.lock()?;
        let memory = sessions.entry(id.to_string()).or_insert_with(|| {
            tracing::debug!(session = id, "opened session");
            Arc::new(Mutex::new(AssignmentMemory::new()))
        });
        Ok(Arc::clone(memory))
    }

    /// Destroys a session and its bindings. Returns `true` if it existed.
    ///
    /// Callers still holding a [`SharedMemory`] keep a detached copy; a later
    /// [`open`](Self::open) with the same id starts from empty bindings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Internal`] if the registry lock is poisoned.
    pub fn close(&self, id: &str) -> Result<bool> {
        let removed = self.sessions.lock()?.remove(id).is_some();
        if removed {
            tracing::debug!(session = id, "closed session");
        }
        Ok(removed)
    }

    /// Runs `f` with exclusive access to the memory of session `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Internal`] if a lock is poisoned.
    pub fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut AssignmentMemory) -> T,
    ) -> Result<T> {
        let memory = self.open(id)?;
        let mut guard = memory.lock()?;
        Ok(f(&mut guard))
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().map_or(0, |s| s.len())
    }

    /// Returns `true` if no session is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
