//! # Application State
//!
//! Core business state for EduBot. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── store: Box<dyn KeyValueStore>   // persisted session id + theme
//! ├── config: ResolvedConfig          // timings, defaults, server URL
//! ├── session: SessionManager         // active id, pending switch, session list
//! ├── transcript: Transcript          // messages of the active session
//! ├── theme: Theme                    // dark / light
//! ├── busy: bool                      // chat request outstanding (typing indicator)
//! ├── quiz_in_flight: bool            // one quiz request at a time
//! ├── flashcards_in_flight: bool      // one flashcard request at a time
//! ├── refresh_in_flight: bool         // one session-list fetch at a time
//! ├── upload: Option<UploadBatch>     // current batch, until its cleanup timer fires
//! └── banner: Option<Banner>          // transient status line
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::time::Instant;

use rand::rngs::StdRng;

use crate::core::config::ResolvedConfig;
use crate::core::notice::{Banner, BannerKind};
use crate::core::session::SessionManager;
use crate::core::store::KeyValueStore;
use crate::core::theme::Theme;
use crate::core::transcript::Transcript;
use crate::core::upload::UploadBatch;

pub struct App {
    pub store: Box<dyn KeyValueStore>,
    pub config: ResolvedConfig,
    pub session: SessionManager,
    pub transcript: Transcript,
    pub theme: Theme,
    pub busy: bool,
    pub quiz_in_flight: bool,
    pub flashcards_in_flight: bool,
    pub refresh_in_flight: bool,
    pub upload: Option<UploadBatch>,
    pub banner: Option<Banner>,
    pub(crate) rng: StdRng,
    pub(crate) last_refresh: Instant,
    next_batch_id: u64,
}

impl App {
    /// Restores the theme and active session from `store` before anything is drawn.
    pub fn new(mut store: Box<dyn KeyValueStore>, config: ResolvedConfig, mut rng: StdRng) -> Self {
        let theme = Theme::restore(store.as_ref());
        let session = SessionManager::restore(store.as_mut(), &mut rng);
        Self {
            store,
            config,
            session,
            transcript: Transcript::new(),
            theme,
            busy: false,
            quiz_in_flight: false,
            flashcards_in_flight: false,
            refresh_in_flight: false,
            upload: None,
            banner: None,
            rng,
            last_refresh: Instant::now(),
            next_batch_id: 1,
        }
    }

    pub fn upload_pending(&self) -> bool {
        self.upload.as_ref().is_some_and(UploadBatch::is_pending)
    }

    pub(crate) fn next_batch_id(&mut self) -> u64 {
        let id = self.next_batch_id;
        self.next_batch_id += 1;
        id
    }

    /// Show a banner with the generic status lifetime.
    pub(crate) fn status(&mut self, kind: BannerKind, text: impl Into<String>) {
        let lifetime = self.config.status_banner;
        self.banner = Some(Banner::new(kind, text, Instant::now(), lifetime));
    }

    /// Show a banner with the upload banner lifetime.
    pub(crate) fn upload_status(&mut self, kind: BannerKind, text: impl Into<String>) {
        let lifetime = self.config.upload_banner;
        self.banner = Some(Banner::new(kind, text, Instant::now(), lifetime));
    }
}

#[cfg(test)]
mod tests {
    use crate::core::session::SESSION_ID_KEY;
    use crate::core::theme::{THEME_KEY, Theme};
    use crate::test_support::{MemoryStore, test_app, test_app_with};

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert!(!app.busy);
        assert!(app.transcript.is_empty());
        assert!(app.banner.is_none());
        assert!(!app.upload_pending());
        assert_eq!(app.theme, Theme::Dark);
        assert!(app.session.current_id().starts_with("session-"));
    }

    #[test]
    fn test_app_restores_persisted_state() {
        let store = MemoryStore::with(&[(SESSION_ID_KEY, "session-saved0001"), (THEME_KEY, "light")]);
        let app = test_app_with(store);
        assert_eq!(app.session.current_id(), "session-saved0001");
        assert_eq!(app.theme, Theme::Light);
    }

    #[test]
    fn test_batch_ids_increase() {
        let mut app = test_app();
        let a = app.next_batch_id();
        let b = app.next_batch_id();
        assert!(b > a);
    }
}
