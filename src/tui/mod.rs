//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values, and performs the
//! I/O that `update()` asks for through `Effect`.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Requests
//!
//! Every request effect is spawned as its own tokio task against the shared
//! `StudyBackend`. The task sends the completion back as an `Action` over a
//! `std::sync::mpsc` channel, which the event loop drains between frames.
//!
//! ## Redraw Strategy
//!
//! - **Waiting on a chat reply**: draws every ~80ms so the typing indicator animates.
//! - **Idle**: sleeps up to 250ms, only redraws on events, completions, or when a
//!   banner / upload preview expires.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markup;
mod palette;
mod ui;

use std::io::{self, stdout};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::layout::Rect;

use crate::api::{ApiError, HttpBackend, StudyBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::core::store::KeyValueStore;
use crate::core::study::option_index;
use crate::core::transcript::Body;
use crate::tui::component::EventHandler;
use crate::tui::components::message::focusable_items;
use crate::tui::components::{
    InputBox, InputEvent, MessageListState, ScrollTarget, SessionEvent, SessionManagerState,
    StudyEvent, StudyFormState, StudyKind, UploadEvent, UploadFormState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::palette::Palette;

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigate and interact with messages. Typing auto-switches to Input.
    Cursor,
    /// Text editing in the composer. Esc switches to Cursor.
    Input,
}

/// The modal overlay currently on screen.
pub enum Overlay {
    Sessions(SessionManagerState),
    Upload(UploadFormState),
    Study(StudyFormState),
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
    pub overlay: Option<Overlay>,
    /// Conversation area from the last frame, for mouse hit testing
    pub main_area: Rect,
    last_session_id: String,
    last_message_count: usize,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(Palette::for_theme(app.theme)),
            input_mode: InputMode::Input, // User expects to type immediately
            overlay: None,
            main_area: Rect::default(),
            last_session_id: app.session.current_id().to_string(),
            last_message_count: app.transcript.len(),
        }
    }

    /// Reconcile presentation state with `App` after it changed.
    pub fn sync(&mut self, app: &App) {
        let count = app.transcript.len();
        if app.session.current_id() != self.last_session_id || count < self.last_message_count {
            // New or switched session: cached heights and selection are meaningless
            self.message_list = MessageListState::new();
            self.last_session_id = app.session.current_id().to_string();
        } else if count > self.last_message_count {
            self.message_list.request_scroll(ScrollTarget::Bottom);
        }
        self.last_message_count = count;

        if self.message_list.selected_index.is_some_and(|i| i >= count) {
            self.message_list.select(count.checked_sub(1));
        }
        self.input_box.busy = app.busy;
        self.input_box.dimmed = self.input_mode == InputMode::Cursor;
    }

    /// Put text in the composer and hand focus to it.
    pub fn fill_composer(&mut self, text: &str) {
        self.input_box.set_text(text);
        self.input_mode = InputMode::Input;
        self.message_list.select(None);
    }

    /// Interpret one terminal event. Returns the action for `update()`, if any.
    pub fn handle_event(&mut self, app: &App, event: &TuiEvent) -> Option<Action> {
        match event {
            TuiEvent::Resize => return None,
            TuiEvent::ForceQuit => return Some(Action::Quit),
            TuiEvent::ToggleTheme => return Some(Action::ToggleTheme),
            TuiEvent::NewSession => {
                self.overlay = None;
                return Some(Action::NewSession);
            }
            TuiEvent::OpenSessionManager => {
                self.overlay = Some(Overlay::Sessions(SessionManagerState::new(
                    app.session.sessions(),
                    app.session.current_id(),
                )));
                return Some(Action::RefreshSessions);
            }
            TuiEvent::OpenUpload => {
                self.overlay = Some(Overlay::Upload(UploadFormState::new(
                    app.config.default_subject.clone(),
                )));
                return None;
            }
            TuiEvent::OpenQuiz => {
                self.overlay = Some(Overlay::Study(StudyFormState::new(
                    StudyKind::Quiz,
                    app.config.quiz_questions,
                )));
                return None;
            }
            TuiEvent::OpenFlashcards => {
                self.overlay = Some(Overlay::Study(StudyFormState::new(
                    StudyKind::Flashcards,
                    app.config.flashcards,
                )));
                return None;
            }
            _ => {}
        }

        if self.overlay.is_some() {
            return self.handle_overlay_event(app, event);
        }

        match event {
            TuiEvent::MouseMove(_, row) => {
                let hit = self.hit_test(*row);
                self.message_list.select(hit);
                return None;
            }
            TuiEvent::MouseClick(_, row) => {
                if let Some(idx) = self.hit_test(*row) {
                    self.message_list.select(Some(idx));
                    self.input_mode = InputMode::Cursor;
                }
                return None;
            }
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown
            | TuiEvent::ScrollToBottom => {
                self.message_list.handle_event(event);
                return None;
            }
            _ => {}
        }

        match self.input_mode {
            InputMode::Input => self.handle_input_event(app, event),
            InputMode::Cursor => self.handle_cursor_event(app, event),
        }
    }

    fn hit_test(&self, row: u16) -> Option<usize> {
        ui::hit_test_message(
            row,
            self.main_area,
            self.message_list.scroll_state.offset().y,
            &self.message_list.layout.prefix_heights,
        )
    }

    fn handle_overlay_event(&mut self, app: &App, event: &TuiEvent) -> Option<Action> {
        let overlay = self.overlay.as_mut()?;
        let (close, action) = match overlay {
            Overlay::Sessions(state) => match state.handle_event(event, app.session.sessions())? {
                SessionEvent::Load(id) => (true, Some(Action::SwitchSession(id))),
                SessionEvent::CreateNew => (true, Some(Action::NewSession)),
                SessionEvent::Refresh => (false, Some(Action::RefreshSessions)),
                SessionEvent::Dismiss => (true, None),
            },
            Overlay::Upload(state) => match state.handle_event(event)? {
                UploadEvent::Submit { files, subject } => {
                    (true, Some(Action::UploadRequested { files, subject }))
                }
                UploadEvent::Cancel => (true, None),
            },
            Overlay::Study(state) => match state.handle_event(event)? {
                StudyEvent::Quiz(config) => (true, Some(Action::QuizRequested(config))),
                StudyEvent::Flashcards(config) => (true, Some(Action::FlashcardsRequested(config))),
                StudyEvent::Cancel => (true, None),
            },
        };
        if close {
            self.overlay = None;
        }
        action
    }

    fn handle_input_event(&mut self, app: &App, event: &TuiEvent) -> Option<Action> {
        if matches!(event, TuiEvent::Escape) {
            self.input_mode = InputMode::Cursor;
            // Start on the newest message
            self.message_list.select(app.transcript.len().checked_sub(1));
            self.message_list.request_scroll(ScrollTarget::Selected);
            return None;
        }
        match self.input_box.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::Submit(text)),
            InputEvent::ContentChanged => None,
        }
    }

    fn handle_cursor_event(&mut self, app: &App, event: &TuiEvent) -> Option<Action> {
        let count = app.transcript.len();
        match event {
            TuiEvent::CursorUp => {
                if count > 0 {
                    let idx = self
                        .message_list
                        .selected_index
                        .map_or(count - 1, |i| i.saturating_sub(1));
                    self.message_list.select(Some(idx));
                    self.message_list.request_scroll(ScrollTarget::Selected);
                }
                None
            }
            TuiEvent::CursorDown => {
                if let Some(idx) = self.message_list.selected_index
                    && idx + 1 < count
                {
                    self.message_list.select(Some(idx + 1));
                    self.message_list.request_scroll(ScrollTarget::Selected);
                }
                None
            }
            // Enter switches to Input mode
            TuiEvent::Submit => {
                self.input_mode = InputMode::Input;
                self.message_list.select(None);
                None
            }
            TuiEvent::InputChar(c) => match self.widget_key(app, *c) {
                Some(outcome) => outcome,
                None => self.start_typing(event),
            },
            TuiEvent::Paste(_) => self.start_typing(event),
            _ => None,
        }
    }

    /// Interpret `c` against the selected message. `None` means the key has no
    /// meaning there and should go to the composer.
    fn widget_key(&mut self, app: &App, c: char) -> Option<Option<Action>> {
        let index = self.message_list.selected_index?;
        let message = app.transcript.get(index)?;
        let focus = self.message_list.focus;
        let items = focusable_items(message);

        let action = match (&message.body, c) {
            (_, '[') if items > 0 => {
                self.message_list.move_focus(-1, items);
                None
            }
            (_, ']') if items > 0 => {
                self.message_list.move_focus(1, items);
                None
            }
            (Body::Quiz(quiz), c) => {
                let option = option_index(c)?;
                quiz.questions.get(focus).filter(|q| option < q.options.len())?;
                Some(Action::AnswerQuestion {
                    message: index,
                    question: focus,
                    option,
                })
            }
            (Body::Flashcards(_), ' ') => Some(Action::FlipCard {
                message: index,
                card: focus,
            }),
            (Body::Flashcards(_), 's') => Some(Action::ShuffleCards { message: index }),
            (Body::Flashcards(_), 'r') => Some(Action::ResetCards { message: index }),
            (Body::Text(_), '1'..='9') => {
                let follow_up = c as usize - '1' as usize;
                if follow_up >= message.follow_ups.len() {
                    return None;
                }
                Some(Action::SelectFollowUp {
                    message: index,
                    index: follow_up,
                })
            }
            _ => return None,
        };
        Some(action)
    }

    /// Typing in Cursor mode switches to Input mode and forwards the event.
    fn start_typing(&mut self, event: &TuiEvent) -> Option<Action> {
        self.input_mode = InputMode::Input;
        self.message_list.select(None);
        self.input_box.handle_event(event);
        None
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol is harmlessly ignored by terminals that lack it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Spawns one tokio task per request effect and reports completions as actions.
struct Spawner {
    backend: Arc<dyn StudyBackend>,
    tx: mpsc::Sender<Action>,
}

impl Spawner {
    fn spawn(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        match effect {
            Effect::SendChat {
                session_id,
                message,
            } => {
                info!(
                    "Sending chat message ({} chars) for {}",
                    message.chars().count(),
                    session_id
                );
                tokio::spawn(async move {
                    let result = backend.chat(&session_id, &message).await;
                    log_failure("Chat", &result);
                    deliver(&tx, Action::ChatReplied { session_id, result });
                });
            }
            Effect::Upload {
                batch_id,
                session_id,
                subject,
                files,
            } => {
                info!(
                    "Uploading batch {} ({} files) for {}",
                    batch_id,
                    files.len(),
                    session_id
                );
                tokio::spawn(async move {
                    let result = backend.upload(&session_id, &subject, &files).await;
                    log_failure("Upload", &result);
                    deliver(
                        &tx,
                        Action::UploadFinished {
                            batch_id,
                            session_id,
                            result,
                        },
                    );
                });
            }
            Effect::GenerateQuiz { session_id, config } => {
                info!(
                    "Requesting quiz (topic {:?}, {}, {} questions)",
                    config.topic,
                    config.difficulty.as_str(),
                    config.count()
                );
                tokio::spawn(async move {
                    let result = backend.generate_quiz(&session_id, &config).await;
                    log_failure("Quiz", &result);
                    deliver(&tx, Action::QuizReady { session_id, result });
                });
            }
            Effect::GenerateFlashcards { session_id, config } => {
                info!(
                    "Requesting flashcards (topic {:?}, {} cards)",
                    config.topic,
                    config.count()
                );
                tokio::spawn(async move {
                    let result = backend.generate_flashcards(&session_id, &config).await;
                    log_failure("Flashcard", &result);
                    deliver(&tx, Action::FlashcardsReady { session_id, result });
                });
            }
            Effect::FetchSession(session_id) => {
                info!("Fetching session {}", session_id);
                tokio::spawn(async move {
                    let result = backend.fetch_session(&session_id).await;
                    log_failure("Session fetch", &result);
                    deliver(&tx, Action::SessionLoaded { session_id, result });
                });
            }
            Effect::RefreshSessions => {
                info!("Refreshing session list");
                tokio::spawn(async move {
                    let result = backend.list_sessions().await;
                    log_failure("Session list", &result);
                    deliver(&tx, Action::SessionsListed(result));
                });
            }
            other => debug!("No request to spawn for {:?}", other),
        }
    }
}

fn log_failure<T>(what: &str, result: &Result<T, ApiError>) {
    if let Err(e) = result {
        warn!("{} request failed: {}", what, e);
    }
}

fn deliver(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver completion: receiver dropped");
    }
}

/// Carry out an effect. Returns true when the app should quit.
fn apply_effect(effect: Effect, tui: &mut TuiState, spawner: &Spawner) -> bool {
    match effect {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::FillComposer(text) => tui.fill_composer(&text),
        request => spawner.spawn(request),
    }
    false
}

pub fn run(config: ResolvedConfig, store: impl KeyValueStore + 'static) -> io::Result<()> {
    let backend = HttpBackend::new(config.server_url.clone(), config.request_timeout)
        .map_err(io::Error::other)?;
    let (tx, rx) = mpsc::channel();
    let spawner = Spawner {
        backend: Arc::new(backend),
        tx,
    };

    let mut app = App::new(Box::new(store), config, StdRng::from_entropy());
    let mut tui = TuiState::new(&app);
    info!(
        "Session {} restored (theme {})",
        app.session.current_id(),
        app.theme.as_str()
    );
    let effect = update(&mut app, Action::RefreshSessions);
    apply_effect(effect, &mut tui, &spawner);

    let mut terminal = ratatui::init();
    let terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    let result = event_loop(&mut terminal, &mut app, &mut tui, &spawner, &rx);

    drop(terminal_mode_guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tui: &mut TuiState,
    spawner: &Spawner,
    rx: &mpsc::Receiver<Action>,
) -> io::Result<()> {
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.sync(app);
        if app.busy {
            needs_redraw = true;
        }
        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / 300) as usize;
            terminal.draw(|f| ui::draw_ui(f, app, tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if app.busy {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = tui.handle_event(app, &event) else {
                continue;
            };
            let effect = update(app, action);
            if apply_effect(effect, tui, spawner) {
                info!("Quitting");
                return Ok(());
            }
            tui.sync(app);
        }

        // Completions from background requests
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(app, action);
            if apply_effect(effect, tui, spawner) {
                return Ok(());
            }
        }

        // Expiring banners and upload previews, periodic session refresh
        let before = (app.banner.is_some(), app.upload.is_some());
        let effect = update(app, Action::Tick(Instant::now()));
        if (app.banner.is_some(), app.upload.is_some()) != before {
            needs_redraw = true;
        }
        apply_effect(effect, tui, spawner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::study::{Difficulty, Flashcard, FlashcardSet, Question, Quiz, QuizConfig};
    use crate::core::transcript::Message;
    use crate::test_support::test_app;

    fn quiz_message() -> Message {
        Message::quiz(Quiz {
            title: "Cells".into(),
            difficulty: "beginner".into(),
            total_questions: 2,
            estimated_time: "4 minutes".into(),
            questions: vec![
                Question::new("Q1".into(), vec!["a".into(), "b".into()], 0, "e1".into(), None)
                    .unwrap(),
                Question::new("Q2".into(), vec!["a".into(), "b".into()], 1, "e2".into(), None)
                    .unwrap(),
            ],
        })
    }

    fn flashcard_message() -> Message {
        let card = |t: &str| {
            Flashcard::new(t.into(), "hint".into(), "def".into(), "ex".into(), None)
        };
        Message::flashcards(FlashcardSet::new(vec![card("one"), card("two")]))
    }

    fn cursor_on(app: &App, index: usize) -> TuiState {
        let mut tui = TuiState::new(app);
        tui.input_mode = InputMode::Cursor;
        tui.message_list.select(Some(index));
        tui
    }

    #[test]
    fn test_escape_enters_cursor_mode_on_last_message() {
        let mut app = test_app();
        app.transcript.push(Message::user("hi"));
        app.transcript.push(Message::assistant("hello", vec![]));
        let mut tui = TuiState::new(&app);
        assert!(tui.handle_event(&app, &TuiEvent::Escape).is_none());
        assert_eq!(tui.input_mode, InputMode::Cursor);
        assert_eq!(tui.message_list.selected_index, Some(1));
        assert_eq!(tui.message_list.pending_scroll(), Some(ScrollTarget::Selected));
    }

    #[test]
    fn test_enter_submits_composer_text() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        tui.handle_event(&app, &TuiEvent::Paste("What is mitosis?".into()));
        let action = tui.handle_event(&app, &TuiEvent::Submit);
        assert!(matches!(action, Some(Action::Submit(text)) if text == "What is mitosis?"));
    }

    #[test]
    fn test_typing_in_cursor_mode_returns_to_input() {
        let mut app = test_app();
        app.transcript.push(Message::user("hi"));
        let mut tui = cursor_on(&app, 0);
        assert!(tui.handle_event(&app, &TuiEvent::InputChar('x')).is_none());
        assert_eq!(tui.input_mode, InputMode::Input);
        assert_eq!(tui.message_list.selected_index, None);
        assert_eq!(tui.input_box.buffer, "x");
    }

    #[test]
    fn test_cursor_navigation() {
        let mut app = test_app();
        for i in 0..3 {
            app.transcript.push(Message::user(format!("m{i}")));
        }
        let mut tui = TuiState::new(&app);
        tui.input_mode = InputMode::Cursor;
        tui.handle_event(&app, &TuiEvent::CursorUp);
        assert_eq!(tui.message_list.selected_index, Some(2));
        tui.handle_event(&app, &TuiEvent::CursorUp);
        tui.handle_event(&app, &TuiEvent::CursorUp);
        tui.handle_event(&app, &TuiEvent::CursorUp);
        assert_eq!(tui.message_list.selected_index, Some(0));
        tui.handle_event(&app, &TuiEvent::CursorDown);
        assert_eq!(tui.message_list.selected_index, Some(1));
    }

    #[test]
    fn test_quiz_keys() {
        let mut app = test_app();
        app.transcript.push(quiz_message());
        let mut tui = cursor_on(&app, 0);

        tui.handle_event(&app, &TuiEvent::InputChar(']'));
        let action = tui.handle_event(&app, &TuiEvent::InputChar('b'));
        assert!(matches!(
            action,
            Some(Action::AnswerQuestion { message: 0, question: 1, option: 1 })
        ));

        // 'z' is not an option: it goes to the composer instead
        assert!(tui.handle_event(&app, &TuiEvent::InputChar('z')).is_none());
        assert_eq!(tui.input_mode, InputMode::Input);
        assert_eq!(tui.input_box.buffer, "z");
    }

    #[test]
    fn test_flashcard_keys() {
        let mut app = test_app();
        app.transcript.push(flashcard_message());
        let mut tui = cursor_on(&app, 0);

        tui.handle_event(&app, &TuiEvent::InputChar(']'));
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::InputChar(' ')),
            Some(Action::FlipCard { message: 0, card: 1 })
        ));
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::InputChar('s')),
            Some(Action::ShuffleCards { message: 0 })
        ));
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::InputChar('r')),
            Some(Action::ResetCards { message: 0 })
        ));
    }

    #[test]
    fn test_follow_up_digit() {
        let mut app = test_app();
        app.transcript.push(Message::assistant(
            "Mitosis is...",
            vec!["What is meiosis?".into()],
        ));
        let mut tui = cursor_on(&app, 0);
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::InputChar('1')),
            Some(Action::SelectFollowUp { message: 0, index: 0 })
        ));
        // No second follow-up: the digit is typed instead
        assert!(tui.handle_event(&app, &TuiEvent::InputChar('2')).is_none());
        assert_eq!(tui.input_box.buffer, "2");
    }

    #[test]
    fn test_fill_composer_focuses_input() {
        let mut app = test_app();
        app.transcript.push(Message::user("hi"));
        let mut tui = cursor_on(&app, 0);
        tui.fill_composer("What is meiosis?");
        assert_eq!(tui.input_mode, InputMode::Input);
        assert_eq!(tui.input_box.buffer, "What is meiosis?");
        assert_eq!(tui.message_list.selected_index, None);
    }

    #[test]
    fn test_session_overlay_flow() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        let action = tui.handle_event(&app, &TuiEvent::OpenSessionManager);
        assert!(matches!(action, Some(Action::RefreshSessions)));
        assert!(matches!(tui.overlay, Some(Overlay::Sessions(_))));

        // Keys go to the overlay, not the composer
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::InputChar('r')),
            Some(Action::RefreshSessions)
        ));
        assert!(tui.input_box.buffer.is_empty());

        assert!(tui.handle_event(&app, &TuiEvent::Escape).is_none());
        assert!(tui.overlay.is_none());
    }

    #[test]
    fn test_quiz_form_submits_config() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        tui.handle_event(&app, &TuiEvent::OpenQuiz);
        tui.handle_event(&app, &TuiEvent::Paste("Genetics".into()));
        let action = tui.handle_event(&app, &TuiEvent::Submit);
        let expected = QuizConfig::new("Genetics", Difficulty::Intermediate, app.config.quiz_questions);
        assert!(matches!(action, Some(Action::QuizRequested(config)) if config == expected));
        assert!(tui.overlay.is_none());
    }

    #[test]
    fn test_sync_resets_list_on_session_change() {
        let mut app = test_app();
        app.transcript.push(Message::user("hi"));
        let mut tui = cursor_on(&app, 0);
        tui.sync(&app);
        assert_eq!(tui.message_list.selected_index, Some(0));

        let rng = &mut app.rng;
        app.session.create(app.store.as_mut(), rng);
        app.transcript.clear();
        tui.sync(&app);
        assert_eq!(tui.message_list.selected_index, None);
    }

    #[test]
    fn test_sync_scrolls_to_new_messages() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        app.transcript.push(Message::user("hi"));
        tui.sync(&app);
        assert_eq!(tui.message_list.pending_scroll(), Some(ScrollTarget::Bottom));
        app.busy = true;
        tui.sync(&app);
        assert!(tui.input_box.busy);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let app = test_app();
        let mut tui = TuiState::new(&app);
        assert!(matches!(
            tui.handle_event(&app, &TuiEvent::ForceQuit),
            Some(Action::Quit)
        ));
    }
}
