//! # Session Manager
//!
//! Owns the active session identifier and the last known session list.
//!
//! The identifier is persisted under [`SESSION_ID_KEY`] so it survives
//! restarts. Transcripts themselves live on the backend; switching sessions
//! fetches the named transcript and only commits once the fetch succeeds.
//!
//! ```text
//! begin_switch(b) ──▶ pending = b ──fetch ok──▶ finish_switch(b): current = b, persisted
//!                                  └─fetch err─▶ abandon_switch(b): current unchanged
//! ```
//!
//! A newer `begin_switch` (or `create`) supersedes an older pending switch,
//! so a late completion for the old target is ignored.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;

use crate::api::ApiError;
use crate::core::store::KeyValueStore;

pub const SESSION_ID_KEY: &str = "session_id";

const ID_PREFIX: &str = "session-";
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Generate a fresh identifier: `session-` followed by 9 base-36 characters.
pub fn generate_session_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{ID_PREFIX}{suffix}")
}

/// One entry of the backend's session list.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub preview: String,
    pub last_activity: Option<DateTime<Utc>>,
    pub message_count: usize,
    pub has_files: bool,
}

/// A session switch that could not be completed.
#[derive(Debug)]
pub struct LoadError {
    pub session_id: String,
    pub source: ApiError,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load session {}: {}", self.session_id, self.source)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug)]
pub struct SessionManager {
    current_id: String,
    created_at: DateTime<Utc>,
    has_attachments: bool,
    pending_switch: Option<String>,
    sessions: Vec<SessionSummary>,
}

impl SessionManager {
    /// Resume the persisted session, or start (and persist) a new one on first run.
    pub fn restore<R: Rng + ?Sized>(store: &mut dyn KeyValueStore, rng: &mut R) -> Self {
        let current_id = match store.get(SESSION_ID_KEY).filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                info!("Resuming session {}", id);
                id
            }
            None => {
                let id = generate_session_id(rng);
                info!("First run, created session {}", id);
                persist_id(store, &id);
                id
            }
        };
        Self {
            current_id,
            created_at: Utc::now(),
            has_attachments: false,
            pending_switch: None,
            sessions: Vec::new(),
        }
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn has_attachments(&self) -> bool {
        self.has_attachments
    }

    pub fn mark_attachments(&mut self) {
        self.has_attachments = true;
    }

    /// Start a brand-new session. Any pending switch is abandoned.
    pub fn create<R: Rng + ?Sized>(&mut self, store: &mut dyn KeyValueStore, rng: &mut R) -> &str {
        let id = generate_session_id(rng);
        info!("New session {} (was {})", id, self.current_id);
        persist_id(store, &id);
        self.current_id = id;
        self.created_at = Utc::now();
        self.has_attachments = false;
        self.pending_switch = None;
        &self.current_id
    }

    /// Record `id` as the switch target. Returns `false` when `id` is already
    /// the active session, in which case nothing should be fetched.
    pub fn begin_switch(&mut self, id: &str) -> bool {
        if id == self.current_id {
            debug!("Switch to active session {} ignored", id);
            self.pending_switch = None;
            return false;
        }
        if let Some(prev) = self.pending_switch.replace(id.to_string()) {
            debug!("Switch to {} superseded by {}", prev, id);
        }
        true
    }

    pub fn pending_switch(&self) -> Option<&str> {
        self.pending_switch.as_deref()
    }

    /// Commit a fetched session. Returns `false` (and changes nothing) if `id`
    /// is no longer the pending target.
    pub fn finish_switch(&mut self, id: &str, store: &mut dyn KeyValueStore) -> bool {
        if self.pending_switch.as_deref() != Some(id) {
            debug!("Dropping stale session load for {}", id);
            return false;
        }
        self.pending_switch = None;
        persist_id(store, id);
        self.current_id = id.to_string();
        self.created_at = Utc::now();
        self.has_attachments = self
            .sessions
            .iter()
            .find(|s| s.id == id)
            .is_some_and(|s| s.has_files);
        info!("Switched to session {}", id);
        true
    }

    /// Forget a failed switch. Returns `false` if `id` was already superseded.
    pub fn abandon_switch(&mut self, id: &str) -> bool {
        if self.pending_switch.as_deref() != Some(id) {
            return false;
        }
        self.pending_switch = None;
        true
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    pub fn set_sessions(&mut self, sessions: Vec<SessionSummary>) {
        if let Some(active) = sessions.iter().find(|s| s.id == self.current_id)
            && active.has_files
        {
            self.has_attachments = true;
        }
        self.sessions = sessions;
    }
}

fn persist_id(store: &mut dyn KeyValueStore, id: &str) {
    if let Err(e) = store.set(SESSION_ID_KEY, id) {
        warn!("Failed to persist session id {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn summary(id: &str, has_files: bool) -> SessionSummary {
        SessionSummary {
            id: id.to_string(),
            preview: String::new(),
            last_activity: None,
            message_count: 0,
            has_files,
        }
    }

    #[test]
    fn test_generated_id_format() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let id = generate_session_id(&mut rng);
            let suffix = id.strip_prefix("session-").unwrap();
            assert_eq!(suffix.len(), 9);
            assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_first_run_generates_and_persists() {
        let mut store = MemoryStore::default();
        let manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(3));
        assert!(manager.current_id().starts_with("session-"));
        assert_eq!(store.get(SESSION_ID_KEY).as_deref(), Some(manager.current_id()));
    }

    #[test]
    fn test_restore_resumes_persisted_id() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(3));
        assert_eq!(manager.current_id(), "session-abc");
    }

    #[test]
    fn test_create_replaces_and_persists() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut manager = SessionManager::restore(&mut store, &mut rng);
        manager.mark_attachments();
        manager.begin_switch("session-other");

        let id = manager.create(&mut store, &mut rng).to_string();
        assert_ne!(id, "session-abc");
        assert_eq!(store.get(SESSION_ID_KEY), Some(id));
        assert!(!manager.has_attachments());
        assert_eq!(manager.pending_switch(), None);
    }

    #[test]
    fn test_switch_to_current_is_noop() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let mut manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(0));
        assert!(!manager.begin_switch("session-abc"));
        assert_eq!(manager.pending_switch(), None);
        assert_eq!(manager.current_id(), "session-abc");
    }

    #[test]
    fn test_finish_switch_commits() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let mut manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(0));
        manager.set_sessions(vec![summary("session-xyz", true)]);

        assert!(manager.begin_switch("session-xyz"));
        assert!(manager.finish_switch("session-xyz", &mut store));
        assert_eq!(manager.current_id(), "session-xyz");
        assert_eq!(store.get(SESSION_ID_KEY).as_deref(), Some("session-xyz"));
        assert!(manager.has_attachments());
    }

    #[test]
    fn test_latest_switch_supersedes() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let mut manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(0));
        manager.begin_switch("session-one");
        manager.begin_switch("session-two");

        assert!(!manager.finish_switch("session-one", &mut store));
        assert_eq!(manager.current_id(), "session-abc");
        assert!(!manager.abandon_switch("session-one"));
        assert_eq!(manager.pending_switch(), Some("session-two"));
    }

    #[test]
    fn test_abandon_keeps_current() {
        let mut store = MemoryStore::with(&[(SESSION_ID_KEY, "session-abc")]);
        let mut manager = SessionManager::restore(&mut store, &mut StdRng::seed_from_u64(0));
        manager.begin_switch("session-xyz");
        assert!(manager.abandon_switch("session-xyz"));
        assert_eq!(manager.current_id(), "session-abc");
        assert_eq!(store.get(SESSION_ID_KEY).as_deref(), Some("session-abc"));
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError {
            session_id: "session-x".into(),
            source: ApiError::Transport("timed out".into()),
        };
        assert_eq!(
            err.to_string(),
            "failed to load session session-x: transport error: timed out"
        );
    }
}
