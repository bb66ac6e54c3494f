//! Login session persistence and expiry signalling.
//!
//! A session is a bearer token plus the username it was issued to. It is
//! stored as a small TOML file under the user's config directory so that a
//! login survives process restarts, mirroring how the browser dashboard kept
//! its token in local storage.
//!
//! [`UnauthorizedGate`] arbitrates the "session expired" path: many requests
//! can fail with 401 at once, but only the first failure should tear down the
//! session and notify the operator.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};

/// Username accepted for offline demo mode.
pub const DEMO_USERNAME: &str = "admin";
/// Password accepted for offline demo mode.
pub const DEMO_PASSWORD: &str = "admin";
/// Placeholder token issued by demo mode. The server rejects it, so demo
/// sessions only make sense against mock data.
pub const DEMO_TOKEN: &str = "mock-jwt-token-xyz";

/// An authenticated session as persisted on disk.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Session {
            token: token.into(),
            username: username.into(),
        }
    }
}

/// Issue a demo session when the demo credentials are supplied.
///
/// Returns `None` for any other username/password pair so callers can fall
/// through to a real login attempt.
pub fn demo_session(username: &str, password: &str) -> Option<Session> {
    if username == DEMO_USERNAME && password == DEMO_PASSWORD {
        Some(Session::new(DEMO_TOKEN, username))
    } else {
        None
    }
}

/// Loads and saves the session file.
///
/// All I/O errors on `load` are treated as "no session": a corrupt or
/// unreadable file should send the operator to the login screen, not crash
/// the client.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    /// Store at the conventional per-user location,
    /// `<config dir>/jellywatch/session.toml`.
    pub fn default_location() -> anyhow::Result<Self> {
        let base = dirs::config_dir().context("no user config directory available")?;
        Ok(SessionStore::at(base.join("jellywatch").join("session.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted session, if any.
    pub fn load(&self) -> Option<Session> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match toml::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("ignoring malformed session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Persist a session, creating parent directories as needed.
    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = toml::to_string(session)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Delete the session file. Missing file is not an error.
    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// One-shot latch for the 401 teardown path.
///
/// `trip` returns `true` exactly once per armed period; concurrent callers
/// racing on the same expiry all observe `false` after the winner. `reset`
/// re-arms the gate after a fresh login.
#[derive(Debug, Default)]
pub struct UnauthorizedGate {
    tripped: AtomicBool,
}

impl UnauthorizedGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the gate. Returns whether this call was the one that tripped it.
    pub fn trip(&self) -> bool {
        !self.tripped.swap(true, Ordering::SeqCst)
    }

    /// Re-arm after a successful login.
    pub fn reset(&self) {
        self.tripped.store(false, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}

/// Live session state shared across the client and the views.
///
/// Combines the persisted store, an in-memory copy of the current session,
/// and the expiry gate. The handle is the only writer of session state; the
/// narrow accessor surface keeps callers from reaching into storage directly.
#[derive(Debug)]
pub struct SessionHandle {
    store: SessionStore,
    current: RwLock<Option<Session>>,
    gate: UnauthorizedGate,
}

impl SessionHandle {
    /// Wrap a store, loading any persisted session into memory.
    pub fn new(store: SessionStore) -> Self {
        let current = RwLock::new(store.load());
        SessionHandle {
            store,
            current,
            gate: UnauthorizedGate::new(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().unwrap().as_ref().map(|s| s.token.clone())
    }

    pub fn username(&self) -> Option<String> {
        self.current.read().unwrap().as_ref().map(|s| s.username.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    /// Install a fresh session after a successful login and re-arm the
    /// expiry gate.
    pub fn establish(&self, session: Session) -> anyhow::Result<()> {
        self.store.save(&session)?;
        *self.current.write().unwrap() = Some(session);
        self.gate.reset();
        Ok(())
    }

    /// Drop the session locally and on disk. Token and username go together.
    pub fn clear(&self) -> anyhow::Result<()> {
        *self.current.write().unwrap() = None;
        self.store.clear()
    }

    /// Invalidate on an authorization failure. Returns `true` only for the
    /// first caller since the last login; that caller owns the user-facing
    /// teardown.
    pub fn expire(&self) -> bool {
        if !self.gate.trip() {
            return false;
        }
        if let Err(e) = self.clear() {
            warn!("failed to clear expired session: {e:#}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store(name: &str) -> SessionStore {
        let dir = std::env::temp_dir().join(format!("jw-session-{}-{}", name, std::process::id()));
        SessionStore::at(dir.join("session.toml"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = scratch_store("round-trip");
        let session = Session::new("tok-1", "researcher");
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
        store.clear().unwrap();
    }

    #[test]
    fn missing_file_loads_as_none() {
        let store = scratch_store("missing");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let store = scratch_store("malformed");
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not = [valid").unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[test]
    fn clear_is_idempotent() {
        let store = scratch_store("clear");
        store.clear().unwrap();
        store.save(&Session::new("tok", "user")).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn gate_trips_exactly_once_until_reset() {
        let gate = UnauthorizedGate::new();
        assert!(gate.trip(), "first failure should win the gate");
        assert!(!gate.trip(), "second failure must not re-fire");
        assert!(gate.is_tripped());
        gate.reset();
        assert!(gate.trip(), "gate should re-arm after login");
    }

    #[test]
    fn demo_credentials_issue_mock_token() {
        let session = demo_session(DEMO_USERNAME, DEMO_PASSWORD).unwrap();
        assert_eq!(session.token, DEMO_TOKEN);
        assert_eq!(session.username, "admin");
        assert_eq!(demo_session("admin", "wrong"), None);
        assert_eq!(demo_session("guest", "admin"), None);
    }

    #[test]
    fn handle_establishes_and_clears_session() {
        let handle = SessionHandle::new(scratch_store("handle"));
        assert!(!handle.is_authenticated());
        assert_eq!(handle.token(), None);

        handle.establish(Session::new("tok-9", "researcher")).unwrap();
        assert!(handle.is_authenticated());
        assert_eq!(handle.token().as_deref(), Some("tok-9"));
        assert_eq!(handle.username().as_deref(), Some("researcher"));

        handle.clear().unwrap();
        assert!(!handle.is_authenticated());
        assert_eq!(handle.username(), None);
    }

    #[test]
    fn handle_picks_up_persisted_session() {
        let store = scratch_store("handle-persisted");
        store.save(&Session::new("tok-old", "returning")).unwrap();
        let handle = SessionHandle::new(store.clone());
        assert_eq!(handle.token().as_deref(), Some("tok-old"));
        store.clear().unwrap();
    }

    #[test]
    fn expire_fires_once_and_rearms_on_login() {
        let handle = SessionHandle::new(scratch_store("handle-expire"));
        handle.establish(Session::new("tok-1", "researcher")).unwrap();

        assert!(handle.expire(), "first expiry owns the teardown");
        assert!(!handle.is_authenticated());
        assert!(!handle.expire(), "a 401 burst must tear down only once");

        handle.establish(Session::new("tok-2", "researcher")).unwrap();
        assert!(handle.expire(), "expiry re-arms after a new login");
    }
}
