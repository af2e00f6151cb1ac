//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: session id, activity markers, theme
//! - `LandingPage`: welcome screen with suggested actions
//! - `message::MessageView`: one transcript entry (text, quiz or flashcards)
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `InputBox`: the composer, with character counter
//! - `MessageList`: scrollable conversation view with layout caching
//! - `SessionManager`, `UploadForm`, `StudyForm`: modal overlays
//!
//! Overlays follow the persistent state + transient wrapper pattern: the
//! `*State` struct lives in `TuiState`, the wrapper is built each frame with
//! borrowed props.
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props (struct fields or constructor
//! arguments), never by reaching into `App` themselves:
//!
//! ```rust,ignore
//! // Good: dependencies are explicit
//! SessionManager::new(&mut state, app.session.sessions(), app.session.current_id(), ..)
//!
//! // Bad: hidden dependency on global state
//! SessionManager::new(&mut state).render(frame, area); // reads from global App
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── title_bar.rs      (top status bar)
//! ├── landing.rs        (welcome screen)
//! ├── message.rs        (single message renderer)
//! ├── message_list.rs   (scrollable message container)
//! ├── input_box/        (composer)
//! ├── form_field.rs     (single-line field used by the forms)
//! ├── session_manager.rs
//! ├── upload_form.rs
//! └── study_form.rs
//! ```

mod form_field;
mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState, ScrollTarget};
pub mod landing;
pub mod session_manager;
pub mod study_form;
pub mod upload_form;
pub use landing::LandingPage;
pub use session_manager::{SessionEvent, SessionManager, SessionManagerState};
pub use study_form::{StudyEvent, StudyForm, StudyFormState, StudyKind};
pub use upload_form::{UploadEvent, UploadForm, UploadFormState};
