pub mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::billing::{CancelConfirmation, CheckoutSessionHandle, CheckoutSessionSnapshot, SubscriptionState};
use crate::dashboard::{DashboardStats, InterviewHistoryEntry};
use crate::evaluation::{EvaluationReport, EvaluationSubmission};
use crate::interview::InterviewQuestion;
use crate::session::{InterviewType, ParsedResume, SetupState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("authentication required")]
    AuthRequired,
    #[error("{message}")]
    Backend {
        message: String,
        detail: Option<String>,
    },
    #[error("malformed response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Resume file handed to the backend for extraction. The extraction
/// itself is a remote capability; the client only moves bytes.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResumeUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub fn from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read resume file {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume")
            .to_string();
        Ok(ResumeUpload { file_name, bytes })
    }
}

/// Frozen wizard output shipped to question generation. All-or-nothing:
/// the backend returns the full question list or a failure.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GenerateQuestionsRequest {
    pub interview_type: InterviewType,
    pub question_count: u32,
    pub setup: SetupState,
    #[serde(default)]
    pub resume: Option<ParsedResume>,
}

impl GenerateQuestionsRequest {
    pub fn from_setup(setup: SetupState, resume: Option<ParsedResume>) -> Self {
        let interview_type = setup.interview_type.unwrap_or(InterviewType::Mixed);
        GenerateQuestionsRequest {
            interview_type,
            question_count: setup.question_count,
            setup,
            resume,
        }
    }
}

/// Every backend operation the client orchestrates against. Implemented by
/// [`ApiClient`] over HTTP and by literal fakes in tests. Implementations
/// must return the normalized error shape and never panic across this
/// boundary.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn parse_resume(&self, upload: ResumeUpload) -> ApiResult<ParsedResume>;

    async fn generate_questions(
        &self,
        request: GenerateQuestionsRequest,
    ) -> ApiResult<Vec<InterviewQuestion>>;

    /// Idempotent per logical submission: the payload's session id
    /// correlates retries so resubmission never produces a second report.
    async fn submit_evaluation(
        &self,
        submission: EvaluationSubmission,
    ) -> ApiResult<EvaluationReport>;

    async fn get_dashboard_stats(&self) -> ApiResult<DashboardStats>;

    async fn get_interview_history(&self) -> ApiResult<Vec<InterviewHistoryEntry>>;

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<CheckoutSessionHandle>;

    async fn get_subscription(&self) -> ApiResult<SubscriptionState>;

    async fn get_checkout_session(&self, session_id: &str) -> ApiResult<CheckoutSessionSnapshot>;

    async fn cancel_subscription(&self) -> ApiResult<CancelConfirmation>;
}
