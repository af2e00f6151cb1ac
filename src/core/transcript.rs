//! # Transcript
//!
//! The ordered, append-only list of messages for the active session.
//!
//! User content is plain text and is always displayed verbatim. Assistant
//! content is rich markup produced by the backend (Markdown plus a small HTML
//! subset) and is rendered, not escaped.
//!
//! `revision` bumps on every mutation so the view can cheaply tell when its
//! cached layout is stale.

use chrono::{DateTime, Utc};

use crate::core::study::{FlashcardSet, Quiz};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Backend history roles: `"user"` is the user, anything else is the assistant.
    pub fn from_history(role: &str) -> Role {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Quiz(Quiz),
    Flashcards(FlashcardSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub body: Body,
    pub timestamp: DateTime<Utc>,
    /// Suggested next questions. Only ever set on assistant text.
    pub follow_ups: Vec<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            body: Body::Text(text.into()),
            timestamp: Utc::now(),
            follow_ups: Vec::new(),
        }
    }

    pub fn assistant(markup: impl Into<String>, follow_ups: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            body: Body::Text(markup.into()),
            timestamp: Utc::now(),
            follow_ups,
        }
    }

    pub fn quiz(quiz: Quiz) -> Self {
        Self {
            role: Role::Assistant,
            body: Body::Quiz(quiz),
            timestamp: Utc::now(),
            follow_ups: Vec::new(),
        }
    }

    pub fn flashcards(set: FlashcardSet) -> Self {
        Self {
            role: Role::Assistant,
            body: Body::Flashcards(set),
            timestamp: Utc::now(),
            follow_ups: Vec::new(),
        }
    }

    pub fn from_history(role: &str, content: String) -> Self {
        match Role::from_history(role) {
            Role::User => Self::user(content),
            Role::Assistant => Self::assistant(content, Vec::new()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for quiz and flashcard messages, which take keyboard interaction.
    pub fn is_widget(&self) -> bool {
        !matches!(self.body, Body::Text(_))
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    /// Swap in a whole transcript (session switch).
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Mutable access for widget interaction. Counts as a mutation.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Message> {
        let message = self.messages.get_mut(index)?;
        self.revision += 1;
        Some(message)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_count_and_order() {
        let mut transcript = Transcript::new();
        for i in 0..25 {
            if i % 2 == 0 {
                transcript.push(Message::user(format!("q{i}")));
            } else {
                transcript.push(Message::assistant(format!("a{i}"), vec![]));
            }
            assert_eq!(transcript.len(), i + 1);
        }
        let texts: Vec<&str> = transcript.iter().filter_map(Message::text).collect();
        let expected: Vec<String> = (0..25)
            .map(|i| if i % 2 == 0 { format!("q{i}") } else { format!("a{i}") })
            .collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn test_replace_swaps_everything() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("old"));
        transcript.replace(vec![Message::user("new 1"), Message::assistant("new 2", vec![])]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.get(0).and_then(Message::text), Some("new 1"));
        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut transcript = Transcript::new();
        let r0 = transcript.revision();
        transcript.push(Message::user("hi"));
        let r1 = transcript.revision();
        assert!(r1 > r0);

        assert!(transcript.get_mut(5).is_none());
        assert_eq!(transcript.revision(), r1);

        transcript.get_mut(0);
        assert!(transcript.revision() > r1);
    }

    #[test]
    fn test_history_role_mapping() {
        assert_eq!(Role::from_history("user"), Role::User);
        assert_eq!(Role::from_history("assistant"), Role::Assistant);
        assert_eq!(Role::from_history("system"), Role::Assistant);
        assert!(Message::from_history("user", "x".into()).follow_ups.is_empty());
    }
}
