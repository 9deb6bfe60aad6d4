//! Conversation session state and its persistence.
//!
//! A [`Session`] is the only durable entity on the client: a started flag and
//! the identifier the chat service assigned.  [`SessionState`] owns the live
//! copy, writes it through a [`SessionStore`] after every mutation, and keeps
//! the [`Incarnation`] counter that tags in-flight requests.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};

use crate::error::{Error, Result};

/// Key under which the session is persisted.
pub const SESSION_KEY: &str = "conversationState";

/// The client-tracked conversation session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether a conversation is active.
    #[serde(rename = "conversationStarted", default)]
    pub started: bool,

    /// Identifier assigned by the chat service.  Only set while started.
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl Session {
    /// A session that has not been started.
    pub fn not_started() -> Self {
        Self::default()
    }

    /// A started session with an optional service-assigned identifier.
    pub fn started(user_id: Option<String>) -> Self {
        Self {
            started: true,
            user_id,
        }
    }

    // A user id without a started flag is meaningless; drop it.
    fn normalized(mut self) -> Self {
        if !self.started {
            self.user_id = None;
        }
        self
    }
}

/// Monotonic identifier of one session lifetime.
///
/// Requests carry the incarnation current when they were issued.  Responses
/// whose incarnation is older than the current one are stale.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Incarnation(u64);

impl Incarnation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Incarnation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A string key-value store, the persistence seam for session state.
pub trait SessionStore: Send {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Remove `key` from the store.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, used in tests and when no state file is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file holding a map of string values.
///
/// The file is read on every `get` and rewritten on every `set`, so several
/// clients sharing a file see each other's latest write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => return Err(Error::io("failed to open state file", err)),
        };
        from_reader(BufReader::new(file))
            .map_err(|err| Error::serialization("failed to parse state file", Some(Box::new(err))))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| Error::io("failed to create state directory", err))?;
        }
        let file = File::create(&self.path)
            .map_err(|err| Error::io("failed to create state file", err))?;
        to_writer_pretty(BufWriter::new(file), entries).map_err(|err| {
            Error::serialization("failed to serialize state file", Some(Box::new(err)))
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        // A corrupt file is replaced rather than blocking every later save.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// The live session, its persisted copy, and the incarnation counter.
pub struct SessionState<S: SessionStore> {
    store: S,
    session: Session,
    incarnation: Incarnation,
}

impl<S: SessionStore> SessionState<S> {
    /// Restore the session from `store`.
    ///
    /// Missing, unreadable, or malformed state yields a not-started session;
    /// this never fails.
    pub fn load(store: S) -> Self {
        let session = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => session.normalized(),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding malformed session state");
                    Session::not_started()
                }
            },
            Ok(None) => Session::not_started(),
            Err(err) => {
                tracing::warn!(error = %err, "could not read session state");
                Session::not_started()
            }
        };
        tracing::debug!(started = session.started, user_id = ?session.user_id, "session restored");
        Self {
            store,
            session,
            incarnation: Incarnation::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_started(&self) -> bool {
        self.session.started
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.user_id.as_deref()
    }

    pub fn incarnation(&self) -> Incarnation {
        self.incarnation
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write the current session to the store.
    pub fn save(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.session)?;
        self.store.set(SESSION_KEY, raw)
    }

    /// Begin a new lifetime and return its incarnation.
    ///
    /// Anything still in flight for the previous lifetime becomes stale.
    pub fn advance(&mut self) -> Incarnation {
        self.incarnation = self.incarnation.next();
        self.incarnation
    }

    /// Record a successful start and persist it.
    pub fn mark_started(&mut self, user_id: Option<String>) -> Result<()> {
        self.session = Session::started(user_id);
        self.save()
    }

    /// Clear the session, persist it, and begin a new incarnation.
    ///
    /// The returned incarnation is the one the caller's next start request
    /// must carry.
    pub fn reset(&mut self) -> Result<Incarnation> {
        self.session = Session::not_started();
        let incarnation = self.advance();
        self.save()?;
        Ok(incarnation)
    }
}
