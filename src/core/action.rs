//! # Actions
//!
//! Everything that can happen in EduBot becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend responds? That's `Action::ChatReplied { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing the I/O the adapter should start.
//! No network calls happen here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Every completion carries the session id its request was issued for. A
//! completion for a session that is no longer active only clears the
//! in-flight flag of its kind; its content is dropped.

use std::time::Instant;

use log::{debug, info, warn};

use crate::api::{ApiError, ChatReply, UploadReceipt};
use crate::core::composer::{self, MAX_MESSAGE_CHARS};
use crate::core::notice::BannerKind;
use crate::core::session::{LoadError, SessionSummary};
use crate::core::state::App;
use crate::core::study::{FlashcardConfig, FlashcardSet, Quiz, QuizConfig};
use crate::core::transcript::{Body, Message};
use crate::core::upload::{self, SelectedFile, UploadBatch, UploadStatus};

pub const CHAT_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again!";
pub const CONNECTION_ERROR_TEXT: &str =
    "Connection error. Please check your internet and try again.";

#[derive(Debug)]
pub enum Action {
    // Composer
    Submit(String),
    ChatReplied {
        session_id: String,
        result: Result<ChatReply, ApiError>,
    },
    SelectFollowUp {
        message: usize,
        index: usize,
    },

    // Sessions
    NewSession,
    SwitchSession(String),
    SessionLoaded {
        session_id: String,
        result: Result<Vec<Message>, ApiError>,
    },
    RefreshSessions,
    SessionsListed(Result<Vec<SessionSummary>, ApiError>),

    // Uploads
    UploadRequested {
        files: Vec<SelectedFile>,
        subject: String,
    },
    UploadFinished {
        batch_id: u64,
        session_id: String,
        result: Result<UploadReceipt, ApiError>,
    },

    // Study tools
    QuizRequested(QuizConfig),
    QuizReady {
        session_id: String,
        result: Result<Quiz, ApiError>,
    },
    FlashcardsRequested(FlashcardConfig),
    FlashcardsReady {
        session_id: String,
        result: Result<FlashcardSet, ApiError>,
    },
    AnswerQuestion {
        message: usize,
        question: usize,
        option: usize,
    },
    FlipCard {
        message: usize,
        card: usize,
    },
    ShuffleCards {
        message: usize,
    },
    ResetCards {
        message: usize,
    },

    // Preferences and housekeeping
    ToggleTheme,
    Tick(Instant),
    Quit,
}

/// I/O the adapter performs after `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    SendChat {
        session_id: String,
        message: String,
    },
    Upload {
        batch_id: u64,
        session_id: String,
        subject: String,
        files: Vec<SelectedFile>,
    },
    GenerateQuiz {
        session_id: String,
        config: QuizConfig,
    },
    GenerateFlashcards {
        session_id: String,
        config: FlashcardConfig,
    },
    FetchSession(String),
    RefreshSessions,
    /// Put text into the composer without submitting it.
    FillComposer(String),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::ChatReplied { session_id, result } => {
            app.busy = false;
            if session_id != app.session.current_id() {
                debug!("Dropping chat reply for inactive session {}", session_id);
                return Effect::None;
            }
            let message = match result {
                Ok(reply) => {
                    let follow_ups = reply.follow_ups().to_vec();
                    Message::assistant(reply.response, follow_ups)
                }
                Err(e) => {
                    warn!("Chat request failed: {}", e);
                    let text = if e.is_transport() {
                        CONNECTION_ERROR_TEXT
                    } else {
                        CHAT_ERROR_TEXT
                    };
                    Message::assistant(text, Vec::new())
                }
            };
            app.transcript.push(message);
            Effect::None
        }
        Action::SelectFollowUp { message, index } => app
            .transcript
            .get(message)
            .and_then(|m| m.follow_ups.get(index))
            .map(|text| Effect::FillComposer(text.clone()))
            .unwrap_or(Effect::None),

        Action::NewSession => {
            let rng = &mut app.rng;
            app.session.create(app.store.as_mut(), rng);
            app.transcript.clear();
            app.status(BannerKind::Success, "New session started");
            request_refresh(app)
        }
        Action::SwitchSession(id) => {
            if app.session.begin_switch(&id) {
                info!("Loading session {}", id);
                Effect::FetchSession(id)
            } else {
                Effect::None
            }
        }
        Action::SessionLoaded { session_id, result } => match result {
            Ok(messages) => {
                if !app.session.finish_switch(&session_id, app.store.as_mut()) {
                    return Effect::None;
                }
                app.transcript.replace(messages);
                app.status(BannerKind::Success, "Session loaded successfully");
                request_refresh(app)
            }
            Err(source) => {
                if app.session.abandon_switch(&session_id) {
                    let err = LoadError { session_id, source };
                    warn!("{}", err);
                    app.status(BannerKind::Error, "Failed to load session");
                }
                Effect::None
            }
        },
        Action::RefreshSessions => request_refresh(app),
        Action::SessionsListed(result) => {
            app.refresh_in_flight = false;
            match result {
                Ok(sessions) => {
                    debug!("Session list refreshed ({} sessions)", sessions.len());
                    app.session.set_sessions(sessions);
                }
                Err(e) => warn!("Failed to refresh session list: {}", e),
            }
            Effect::None
        }

        Action::UploadRequested { files, subject } => {
            if files.is_empty() {
                return Effect::None;
            }
            if app.upload_pending() {
                app.status(BannerKind::Info, "An upload is already in progress");
                return Effect::None;
            }
            let batch_id = app.next_batch_id();
            let session_id = app.session.current_id().to_string();
            let subject = upload::resolve_subject(&subject, &app.config.default_subject);
            info!(
                "Upload batch {} ({} files, subject {:?})",
                batch_id,
                files.len(),
                subject
            );
            app.upload = Some(UploadBatch::new(
                batch_id,
                session_id.clone(),
                files.clone(),
                subject.clone(),
            ));
            Effect::Upload {
                batch_id,
                session_id,
                subject,
                files,
            }
        }
        Action::UploadFinished {
            batch_id,
            session_id,
            result,
        } => {
            let cleanup_delay = app.config.upload_cleanup_delay;
            let Some(batch) = app.upload.as_mut().filter(|b| b.id == batch_id) else {
                debug!("Dropping result for replaced upload batch {}", batch_id);
                return Effect::None;
            };
            let active = session_id == app.session.current_id();
            match result {
                Ok(receipt) => {
                    let processed = receipt.processed_files.len();
                    batch.settle(UploadStatus::Success { processed }, Instant::now(), cleanup_delay);
                    app.upload_status(BannerKind::Success, upload::success_banner(processed));
                    if active {
                        app.session.mark_attachments();
                        app.transcript
                            .push(Message::assistant(upload::acknowledgement(processed), Vec::new()));
                    } else {
                        debug!("Upload batch {} finished for inactive session {}", batch_id, session_id);
                    }
                }
                Err(e) => {
                    warn!("Upload batch {} failed: {}", batch_id, e);
                    let text = match &e {
                        ApiError::Backend(msg) => msg.clone(),
                        ApiError::Transport(_) => upload::UPLOAD_FALLBACK_ERROR.to_string(),
                    };
                    batch.settle(UploadStatus::Error(text.clone()), Instant::now(), cleanup_delay);
                    app.upload_status(BannerKind::Error, text);
                }
            }
            Effect::None
        }

        Action::QuizRequested(config) => {
            if app.quiz_in_flight {
                app.status(BannerKind::Info, "A quiz is already being generated");
                return Effect::None;
            }
            app.quiz_in_flight = true;
            app.status(BannerKind::Info, "Generating quiz...");
            Effect::GenerateQuiz {
                session_id: app.session.current_id().to_string(),
                config,
            }
        }
        Action::QuizReady { session_id, result } => {
            app.quiz_in_flight = false;
            settle_study(app, &session_id, result, "Failed to generate quiz", Message::quiz);
            Effect::None
        }
        Action::FlashcardsRequested(config) => {
            if app.flashcards_in_flight {
                app.status(BannerKind::Info, "Flashcards are already being generated");
                return Effect::None;
            }
            app.flashcards_in_flight = true;
            app.status(BannerKind::Info, "Generating flashcards...");
            Effect::GenerateFlashcards {
                session_id: app.session.current_id().to_string(),
                config,
            }
        }
        Action::FlashcardsReady { session_id, result } => {
            app.flashcards_in_flight = false;
            settle_study(
                app,
                &session_id,
                result,
                "Failed to generate flashcards",
                Message::flashcards,
            );
            Effect::None
        }
        Action::AnswerQuestion {
            message,
            question,
            option,
        } => {
            let open = matches!(
                app.transcript.get(message).map(|m| &m.body),
                Some(Body::Quiz(quiz)) if quiz.questions.get(question).is_some_and(|q| !q.is_answered())
            );
            if open
                && let Some(Message {
                    body: Body::Quiz(quiz),
                    ..
                }) = app.transcript.get_mut(message)
                && let Some(correct) = quiz.answer(question, option)
            {
                debug!("Question {} answered (correct={})", question + 1, correct);
            }
            Effect::None
        }
        Action::FlipCard { message, card } => {
            if let Some(Message {
                body: Body::Flashcards(set),
                ..
            }) = app.transcript.get_mut(message)
            {
                set.flip(card);
            }
            Effect::None
        }
        Action::ShuffleCards { message } => {
            if let Some(Message {
                body: Body::Flashcards(set),
                ..
            }) = app.transcript.get_mut(message)
            {
                set.shuffle(&mut app.rng);
            }
            Effect::None
        }
        Action::ResetCards { message } => {
            if let Some(Message {
                body: Body::Flashcards(set),
                ..
            }) = app.transcript.get_mut(message)
            {
                set.reset();
            }
            Effect::None
        }

        Action::ToggleTheme => {
            app.theme = app.theme.toggled();
            app.theme.persist(app.store.as_mut());
            Effect::None
        }
        Action::Tick(now) => tick(app, now),
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, text: String) -> Effect {
    let message = text.trim();
    if !composer::can_submit(message, app.busy) {
        return Effect::None;
    }
    if composer::char_count(message) > MAX_MESSAGE_CHARS {
        warn!("Refusing message over {} characters", MAX_MESSAGE_CHARS);
        return Effect::None;
    }
    let message = message.to_string();
    app.transcript.push(Message::user(message.clone()));
    app.busy = true;
    Effect::SendChat {
        session_id: app.session.current_id().to_string(),
        message,
    }
}

fn request_refresh(app: &mut App) -> Effect {
    app.last_refresh = Instant::now();
    if app.refresh_in_flight {
        return Effect::None;
    }
    app.refresh_in_flight = true;
    Effect::RefreshSessions
}

/// Shared completion path for quizzes and flashcards.
fn settle_study<T>(
    app: &mut App,
    session_id: &str,
    result: Result<T, ApiError>,
    failure_text: &str,
    into_message: fn(T) -> Message,
) {
    match result {
        Ok(_) if session_id != app.session.current_id() => {
            debug!("Dropping study tool for inactive session {}", session_id);
        }
        Ok(value) => app.transcript.push(into_message(value)),
        Err(e) => {
            warn!("{}: {}", failure_text, e);
            match e {
                ApiError::Backend(msg) => app.status(BannerKind::Error, msg),
                ApiError::Transport(_) => app.status(BannerKind::Error, failure_text),
            }
        }
    }
}

fn tick(app: &mut App, now: Instant) -> Effect {
    if app.banner.as_ref().is_some_and(|b| b.is_expired(now)) {
        app.banner = None;
    }
    if app.upload.as_ref().is_some_and(|b| b.cleanup_due(now)) {
        app.upload = None;
    }
    match app.config.session_refresh {
        Some(every) if now.saturating_duration_since(app.last_refresh) >= every => {
            request_refresh(app)
        }
        _ => Effect::None,
    }
}
