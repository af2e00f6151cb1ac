//! HTTP client for the study backend.
//!
//! All endpoints speak JSON. The backend reports most failures in the body
//! rather than through status codes, so responses are decoded regardless of
//! status and then inspected for an `error` field.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::api::types::{
    ChatReply, ChatRequest, FlashcardRequest, FlashcardResponse, QuizRequest, QuizResponse,
    SessionResponse, SessionsResponse, UploadReceipt, UploadResponse, backend_error,
};
use crate::api::ApiError;
use crate::core::session::SessionSummary;
use crate::core::study::{FlashcardConfig, FlashcardSet, Quiz, QuizConfig};
use crate::core::transcript::Message;
use crate::core::upload::{SelectedFile, UPLOAD_FALLBACK_ERROR};

/// Header carrying the active session identifier.
pub const SESSION_HEADER: &str = "X-Session-ID";

/// The six backend operations the client depends on.
#[async_trait]
pub trait StudyBackend: Send + Sync {
    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError>;

    /// Send every file plus the subject as one multipart submission.
    async fn upload(
        &self,
        session_id: &str,
        subject: &str,
        files: &[SelectedFile],
    ) -> Result<UploadReceipt, ApiError>;

    async fn generate_quiz(&self, session_id: &str, config: &QuizConfig) -> Result<Quiz, ApiError>;

    async fn generate_flashcards(
        &self,
        session_id: &str,
        config: &FlashcardConfig,
    ) -> Result<FlashcardSet, ApiError>;

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError>;

    /// Fetch a stored session's transcript, in order.
    async fn fetch_session(&self, session_id: &str) -> Result<Vec<Message>, ApiError>;
}

/// `StudyBackend` over HTTP using `reqwest`.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!("Backend client targeting {}", base_url);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a body as JSON, whatever the status code.
    async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Non-JSON response (HTTP {}): {}", status, e);
            ApiError::Transport(format!("HTTP {status}: response is not JSON"))
        })
    }

    /// Decode a body, surfacing a backend `error` field before shape checks.
    async fn read_checked<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = Self::read_json(response).await?;
        if let Some(message) = backend_error(&body) {
            return Err(ApiError::Backend(message));
        }
        decode(body)
    }
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Transport(format!("malformed response: {e}")))
}

#[async_trait]
impl StudyBackend for HttpBackend {
    async fn chat(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError> {
        debug!("POST /chat (session={}, len={})", session_id, message.len());
        let response = self
            .client
            .post(self.url("/chat"))
            .header(SESSION_HEADER, session_id)
            .json(&ChatRequest { message, session_id })
            .send()
            .await?;
        Self::read_checked(response).await
    }

    async fn upload(
        &self,
        session_id: &str,
        subject: &str,
        files: &[SelectedFile],
    ) -> Result<UploadReceipt, ApiError> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
                ApiError::Transport(format!("failed to read {}: {e}", file.path.display()))
            })?;
            form = form.part("file", Part::bytes(bytes).file_name(file.name.clone()));
        }
        form = form.text("subject", subject.to_string());

        debug!(
            "POST /upload (session={}, files={}, subject={:?})",
            session_id,
            files.len(),
            subject
        );
        let response = self
            .client
            .post(self.url("/upload"))
            .header(SESSION_HEADER, session_id)
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = decode(Self::read_json(response).await?)?;
        if body.status.as_deref() == Some("success") {
            Ok(UploadReceipt {
                processed_files: body.processed_files.unwrap_or_default(),
            })
        } else {
            Err(ApiError::Backend(
                body.error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| UPLOAD_FALLBACK_ERROR.to_string()),
            ))
        }
    }

    async fn generate_quiz(&self, session_id: &str, config: &QuizConfig) -> Result<Quiz, ApiError> {
        debug!(
            "POST /generate_quiz (topic={:?}, difficulty={}, count={})",
            config.topic,
            config.difficulty.as_str(),
            config.count()
        );
        let response = self
            .client
            .post(self.url("/generate_quiz"))
            .header(SESSION_HEADER, session_id)
            .json(&QuizRequest {
                topic: &config.topic,
                difficulty: config.difficulty,
                num_questions: config.count(),
            })
            .send()
            .await?;
        let body: QuizResponse = Self::read_checked(response).await?;
        body.into_quiz(config.difficulty)
    }

    async fn generate_flashcards(
        &self,
        session_id: &str,
        config: &FlashcardConfig,
    ) -> Result<FlashcardSet, ApiError> {
        debug!(
            "POST /generate_flashcards (topic={:?}, count={})",
            config.topic,
            config.count()
        );
        let response = self
            .client
            .post(self.url("/generate_flashcards"))
            .header(SESSION_HEADER, session_id)
            .json(&FlashcardRequest {
                topic: &config.topic,
                num_cards: config.count(),
            })
            .send()
            .await?;
        let body: FlashcardResponse = Self::read_checked(response).await?;
        Ok(body.into())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let response = self.client.get(self.url("/sessions")).send().await?;
        let body: SessionsResponse = decode(Self::read_json(response).await?)?;
        Ok(body.sessions.into_iter().map(SessionSummary::from).collect())
    }

    async fn fetch_session(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        let mut url = reqwest::Url::parse(&self.url("/session"))
            .map_err(|e| ApiError::Transport(format!("invalid backend URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("backend URL cannot carry a path".to_string()))?
            .push(session_id);

        let response = self.client.get(url).send().await?;
        let body: SessionResponse = decode(Self::read_json(response).await?)?;
        Ok(body.into_messages())
    }
}
