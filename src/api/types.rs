//! Wire types for the study backend.
//!
//! Request bodies borrow from the caller. Response bodies are deserialized
//! leniently (optional metadata defaults) and then converted into the core
//! domain types, which is where shape validation happens.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::core::session::SessionSummary;
use crate::core::study::{Difficulty, Flashcard, FlashcardSet, Question, Quiz};
use crate::core::transcript::Message;

// ============================================================================
// Requests
// ============================================================================

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
}

#[derive(Serialize, Debug)]
pub struct QuizRequest<'a> {
    pub topic: &'a str,
    pub difficulty: Difficulty,
    pub num_questions: u8,
}

#[derive(Serialize, Debug)]
pub struct FlashcardRequest<'a> {
    pub topic: &'a str,
    pub num_cards: u8,
}

// ============================================================================
// Results handed to the core
// ============================================================================

/// A successful `/chat` reply.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub follow_ups: Option<Vec<String>>,
}

impl ChatReply {
    pub fn follow_ups(&self) -> &[String] {
        self.follow_ups.as_deref().unwrap_or_default()
    }
}

/// A successful `/upload` receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub processed_files: Vec<String>,
}

// ============================================================================
// Response bodies
// ============================================================================

/// A JSON value the backend sends as either a string or a number
/// (`estimated_time`, `last_activity`).
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub processed_files: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct QuizResponse {
    #[serde(default)]
    pub quiz_title: Option<String>,
    #[serde(default)]
    pub total_questions: Option<usize>,
    #[serde(default)]
    pub estimated_time: Option<Scalar>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub questions: Vec<QuestionBody>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct QuestionBody {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct FlashcardResponse {
    pub flashcards: Vec<FlashcardBody>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct FlashcardBody {
    pub term: String,
    #[serde(default)]
    pub hint: String,
    pub definition: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SessionsResponse {
    pub sessions: Vec<SessionSummaryBody>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SessionSummaryBody {
    pub id: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub last_activity: Option<Scalar>,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub has_files: bool,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SessionResponse {
    pub session: SessionBody,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SessionBody {
    #[serde(default)]
    pub message_history: Option<Vec<HistoryEntry>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct HistoryEntry {
    pub role: String,
    pub content: String,
}

// ============================================================================
// Conversions
// ============================================================================

/// Returns the backend's error text if the body carries a non-empty `error` field.
pub(crate) fn backend_error(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::Null | serde_json::Value::Bool(false) => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl QuizResponse {
    pub fn into_quiz(self, requested: Difficulty) -> Result<Quiz, ApiError> {
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                Question::new(q.question, q.options, q.correct_answer, q.explanation, q.difficulty)
                    .map_err(|e| ApiError::Transport(format!("malformed quiz question {}: {e}", i + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Quiz {
            title: self.quiz_title.unwrap_or_else(|| "Quiz".to_string()),
            total_questions: self.total_questions.unwrap_or(questions.len()),
            estimated_time: self.estimated_time.map(Scalar::into_text).unwrap_or_default(),
            difficulty: self
                .difficulty
                .unwrap_or_else(|| requested.as_str().to_string()),
            questions,
        })
    }
}

impl From<FlashcardResponse> for FlashcardSet {
    fn from(body: FlashcardResponse) -> Self {
        FlashcardSet::new(
            body.flashcards
                .into_iter()
                .map(|c| Flashcard::new(c.term, c.hint, c.definition, c.example, c.difficulty))
                .collect(),
        )
    }
}

impl From<SessionSummaryBody> for SessionSummary {
    fn from(body: SessionSummaryBody) -> Self {
        SessionSummary {
            id: body.id,
            preview: body.preview,
            last_activity: body.last_activity.and_then(parse_activity),
            message_count: body.message_count,
            has_files: body.has_files,
        }
    }
}

impl SessionResponse {
    pub fn into_messages(self) -> Vec<Message> {
        self.session
            .message_history
            .unwrap_or_default()
            .into_iter()
            .map(|entry| Message::from_history(&entry.role, entry.content))
            .collect()
    }
}

/// Parse a last-activity value: RFC 3339, a naive ISO timestamp (assumed UTC),
/// or a Unix timestamp in seconds or milliseconds.
pub fn parse_activity(value: Scalar) -> Option<DateTime<Utc>> {
    match value {
        Scalar::Text(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Scalar::Number(n) => {
            let raw = n.as_f64()?;
            // Values this large are JavaScript-style milliseconds.
            let secs = if raw.abs() > 1e11 { raw / 1000.0 } else { raw };
            DateTime::<Utc>::from_timestamp(secs as i64, 0)
        }
    }
}
