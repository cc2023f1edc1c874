//! Typed client for the tutoring backend REST API.
//!
//! The backend owns all tutoring logic — question generation, answer
//! evaluation, performance aggregation. This client only shapes requests,
//! threads the auth token, and maps responses/errors into crate types.

use std::time::Duration;

use serde::de::DeserializeOwned;
use sm_api_types::{
    AuthRequest, AuthResponse, ChatMessage, ChatReply, EvaluationResult, FlashcardSet,
    PerformanceUpdate, ProgressReport, Quiz,
};

use crate::queue::{DeliveryError, UpdateTransport};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the tutoring backend API.
#[derive(Debug, thiserror::Error)]
pub enum TutorApiError {
    /// An HTTP-level error (connection failure, DNS, TLS, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API returned a non-success status with a message.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the API response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Token missing, expired, or refused by the backend.
    #[error("unauthorized — log in again")]
    Unauthorized,
}

impl From<reqwest::Error> for TutorApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TutorApiError::Timeout
        } else {
            TutorApiError::Http(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TutorClient
// ---------------------------------------------------------------------------

/// Reusable client for one backend base URL.
#[derive(Debug, Clone)]
pub struct TutorClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl TutorClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Attach a bearer token to subsequent requests.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ----- request plumbing -----

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, TutorApiError> {
        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(TutorApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TutorApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| TutorApiError::Parse(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, TutorApiError> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TutorApiError> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        Self::decode(resp).await
    }

    // ----- auth -----

    /// Exchange credentials for a session token.
    pub async fn login(&self, req: &AuthRequest) -> Result<AuthResponse, TutorApiError> {
        self.post_json("/v1/auth/login", &serde_json::json!(req)).await
    }

    /// Create an account and return its first session token.
    pub async fn register(&self, req: &AuthRequest) -> Result<AuthResponse, TutorApiError> {
        self.post_json("/v1/auth/register", &serde_json::json!(req)).await
    }

    // ----- chat -----

    /// Send the conversation so far and get the tutor's reply.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatReply, TutorApiError> {
        let body = Self::build_chat_body(messages);
        self.post_json("/v1/chat", &body).await
    }

    pub fn build_chat_body(messages: &[ChatMessage]) -> serde_json::Value {
        serde_json::json!({ "messages": messages })
    }

    // ----- study material -----

    /// Ask the backend to generate a flashcard set.
    pub async fn generate_flashcards(
        &self,
        subject: &str,
        topic: &str,
        count: u32,
    ) -> Result<FlashcardSet, TutorApiError> {
        let body = Self::build_material_body(subject, topic, count);
        self.post_json("/v1/study/flashcards", &body).await
    }

    /// Ask the backend to generate a quiz.
    pub async fn generate_quiz(
        &self,
        subject: &str,
        topic: &str,
        count: u32,
    ) -> Result<Quiz, TutorApiError> {
        let body = Self::build_material_body(subject, topic, count);
        self.post_json("/v1/study/quiz", &body).await
    }

    pub fn build_material_body(subject: &str, topic: &str, count: u32) -> serde_json::Value {
        serde_json::json!({
            "subject": subject,
            "topic": topic,
            "count": count,
        })
    }

    /// Have the backend grade a free-text answer.
    pub async fn evaluate_answer(
        &self,
        question_id: &str,
        answer: &str,
    ) -> Result<EvaluationResult, TutorApiError> {
        let body = serde_json::json!({
            "questionId": question_id,
            "answer": answer,
        });
        self.post_json("/v1/study/evaluate", &body).await
    }

    // ----- progress -----

    /// Fetch the aggregated progress report for a user.
    pub async fn fetch_progress(&self, user_id: &str) -> Result<ProgressReport, TutorApiError> {
        self.get_json(&format!("/v1/progress/{user_id}")).await
    }

    /// Submit one performance update.
    ///
    /// Error classification drives the update queue: transport-level
    /// failures are transient (the queue halts and retains the update),
    /// any non-success status is a rejection (the queue drops it).
    pub async fn submit_performance_update(
        &self,
        update: &PerformanceUpdate,
    ) -> Result<(), DeliveryError> {
        let resp = self
            .request(reqwest::Method::POST, "/v1/progress/performance")
            .json(update)
            .send()
            .await
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait::async_trait]
impl UpdateTransport for TutorClient {
    async fn deliver(&self, update: &PerformanceUpdate) -> Result<(), DeliveryError> {
        self.submit_performance_update(update).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
