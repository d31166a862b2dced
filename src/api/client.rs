use base64::Engine;
use log::{debug, error, info};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ApiError, ApiResult, Backend, GenerateQuestionsRequest, ResumeUpload};
use crate::billing::{
    CancelConfirmation, CheckoutSessionHandle, CheckoutSessionSnapshot, SubscriptionState,
};
use crate::config::AppConfig;
use crate::dashboard::{DashboardStats, InterviewHistoryEntry};
use crate::evaluation::{EvaluationReport, EvaluationSubmission};
use crate::interview::InterviewQuestion;
use crate::session::ParsedResume;

/// HTTP implementation of [`Backend`]. One client instance is shared by
/// every component; requests carry explicit timeouts so a hung backend
/// resolves to a retryable error instead of a stuck UI.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        ApiClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.apply_auth(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.apply_auth(self.client.post(format!("{}{}", self.base_url, path)))
    }

    fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the normalized contract: a success payload,
    /// or `{success: false, error, detail?}`. Callers never see transport
    /// status codes, only `ApiError`.
    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRequired);
        }

        let body = response.text().await.map_err(map_transport_error)?;
        decode_body(status, &body)
    }
}

/// Decode the normalized contract from a raw response body: the failure
/// envelope wins regardless of status code, then the payload itself.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<T> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            if value.get("success").and_then(Value::as_bool) == Some(false) {
                let message = value
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("backend reported an error")
                    .to_string();
                let detail = value.get("detail").and_then(Value::as_str).map(String::from);
                error!("Backend error ({}): {}", status, message);
                return Err(ApiError::Backend { message, detail });
            }
            if !status.is_success() {
                error!("Unexpected status {} without failure envelope", status);
                return Err(ApiError::Backend {
                    message: format!("backend returned status {}", status.as_u16()),
                    detail: None,
                });
            }
            serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
        }
        Err(e) => {
            if status.is_success() {
                Err(ApiError::Decode(e.to_string()))
            } else {
                Err(ApiError::Backend {
                    message: format!("backend returned status {}", status.as_u16()),
                    detail: None,
                })
            }
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
impl Backend for ApiClient {
    async fn parse_resume(&self, upload: ResumeUpload) -> ApiResult<ParsedResume> {
        info!("Uploading resume for parsing: {}", upload.file_name);
        let body = serde_json::json!({
            "file_name": upload.file_name,
            "content": base64::engine::general_purpose::STANDARD.encode(&upload.bytes),
        });
        self.execute(self.post("/resume/parse").json(&body)).await
    }

    async fn generate_questions(
        &self,
        request: GenerateQuestionsRequest,
    ) -> ApiResult<Vec<InterviewQuestion>> {
        info!(
            "Requesting {} {} questions",
            request.question_count,
            request.interview_type.as_str()
        );
        self.execute(self.post("/interviews/questions").json(&request))
            .await
    }

    async fn submit_evaluation(
        &self,
        submission: EvaluationSubmission,
    ) -> ApiResult<EvaluationReport> {
        info!(
            "Submitting {} transcripts for evaluation (session {})",
            submission.items.len(),
            submission.session_id
        );
        // The session id doubles as the idempotency key so a retried
        // submission resolves to the original report server-side.
        self.execute(
            self.post("/interviews/evaluate")
                .header("Idempotency-Key", submission.session_id.clone())
                .json(&submission),
        )
        .await
    }

    async fn get_dashboard_stats(&self) -> ApiResult<DashboardStats> {
        debug!("Fetching dashboard stats");
        self.execute(self.get("/dashboard/stats")).await
    }

    async fn get_interview_history(&self) -> ApiResult<Vec<InterviewHistoryEntry>> {
        debug!("Fetching interview history");
        self.execute(self.get("/interviews/history")).await
    }

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<CheckoutSessionHandle> {
        info!("Creating checkout session for plan: {}", plan);
        let body = serde_json::json!({ "plan": plan });
        self.execute(self.post("/billing/checkout").json(&body)).await
    }

    async fn get_subscription(&self) -> ApiResult<SubscriptionState> {
        debug!("Fetching subscription state");
        self.execute(self.get("/billing/subscription")).await
    }

    async fn get_checkout_session(&self, session_id: &str) -> ApiResult<CheckoutSessionSnapshot> {
        debug!("Fetching checkout session: {}", session_id);
        self.execute(self.get(&format!("/billing/checkout/{}", session_id)))
            .await
    }

    async fn cancel_subscription(&self) -> ApiResult<CancelConfirmation> {
        info!("Requesting subscription cancellation");
        self.execute(self.post("/billing/subscription/cancel"))
            .await
    }
}
