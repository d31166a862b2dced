#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use prepmate::api::{ApiResult, Backend, GenerateQuestionsRequest, ResumeUpload};
use prepmate::billing::{
    CancelConfirmation, CheckoutSessionHandle, CheckoutSessionSnapshot, PlanId,
    SubscriptionState, SubscriptionStatus,
};
use prepmate::dashboard::{DashboardStats, InterviewHistoryEntry};
use prepmate::evaluation::{EvaluationReport, EvaluationSubmission, QuestionScore};
use prepmate::interview::{InterviewQuestion, QuestionCategory};
use prepmate::session::ParsedResume;

/// Two-sided gate for deterministic in-flight tests: the backend signals
/// `entered` when the call arrives and parks until `release` fires.
pub struct GenGate {
    pub entered: Notify,
    pub release: Notify,
}

impl GenGate {
    pub fn new() -> Arc<Self> {
        Arc::new(GenGate {
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

/// Scripted in-memory backend. Queue fields pop one scripted response per
/// call and fall back to a deterministic default; option fields apply to
/// every call.
#[derive(Default)]
pub struct FakeBackend {
    pub generate_responses: Mutex<VecDeque<ApiResult<Vec<InterviewQuestion>>>>,
    pub evaluate_responses: Mutex<VecDeque<ApiResult<EvaluationReport>>>,
    pub evaluate_calls: Mutex<Vec<EvaluationSubmission>>,
    pub resume_response: Mutex<Option<ApiResult<ParsedResume>>>,
    pub stats_response: Mutex<Option<ApiResult<DashboardStats>>>,
    pub history_response: Mutex<Option<ApiResult<Vec<InterviewHistoryEntry>>>>,
    pub checkout_create_response: Mutex<Option<ApiResult<CheckoutSessionHandle>>>,
    pub subscription_response: Mutex<Option<ApiResult<SubscriptionState>>>,
    pub checkout_session_response: Mutex<Option<ApiResult<CheckoutSessionSnapshot>>>,
    pub cancel_response: Mutex<Option<ApiResult<CancelConfirmation>>>,
    pub checkout_calls: AtomicUsize,
    pub gen_gate: Mutex<Option<Arc<GenGate>>>,
}

impl FakeBackend {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn checkout_call_count(&self) -> usize {
        self.checkout_calls.load(Ordering::SeqCst)
    }
}

pub fn make_questions(count: u32) -> Vec<InterviewQuestion> {
    (1..=count)
        .map(|n| InterviewQuestion {
            id: format!("q{}", n),
            number: n,
            text: format!("Question {}", n),
            category: if n % 2 == 0 {
                QuestionCategory::Technical
            } else {
                QuestionCategory::Behavioral
            },
            difficulty: None,
            focus_area: None,
        })
        .collect()
}

/// Deterministic report derived from the payload: resubmitting the same
/// submission always produces the same report.
pub fn report_for(submission: &EvaluationSubmission) -> EvaluationReport {
    let answered = submission.items.iter().filter(|i| !i.skipped).count();
    EvaluationReport {
        overall_score: 50.0 + answered as f32 * 5.0,
        technical_score: None,
        behavioral_score: None,
        question_scores: submission
            .items
            .iter()
            .map(|item| QuestionScore {
                question_id: item.question.id.clone(),
                score: if item.skipped { 0.0 } else { 70.0 },
                comment: None,
            })
            .collect(),
        strengths: vec!["Clear communication".to_string()],
        weaknesses: Vec::new(),
        feedback: format!("{} of {} questions answered", answered, submission.items.len()),
        recommendations: Vec::new(),
    }
}

pub fn active_subscription() -> SubscriptionState {
    SubscriptionState {
        plan: PlanId::Pro,
        status: SubscriptionStatus::Active,
        current_period_start: None,
        current_period_end: None,
        cancel_at: None,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn parse_resume(&self, _upload: ResumeUpload) -> ApiResult<ParsedResume> {
        let scripted = self.resume_response.lock().clone();
        scripted.unwrap_or_else(|| {
            Ok(ParsedResume {
                name: Some("Jordan Candidate".to_string()),
                skills: vec!["rust".to_string(), "sql".to_string()],
                ..ParsedResume::default()
            })
        })
    }

    async fn generate_questions(
        &self,
        request: GenerateQuestionsRequest,
    ) -> ApiResult<Vec<InterviewQuestion>> {
        let gate = self.gen_gate.lock().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        let scripted = self.generate_responses.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(make_questions(request.question_count)))
    }

    async fn submit_evaluation(
        &self,
        submission: EvaluationSubmission,
    ) -> ApiResult<EvaluationReport> {
        self.evaluate_calls.lock().push(submission.clone());
        let scripted = self.evaluate_responses.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(report_for(&submission)))
    }

    async fn get_dashboard_stats(&self) -> ApiResult<DashboardStats> {
        let scripted = self.stats_response.lock().clone();
        scripted.unwrap_or_else(|| Ok(DashboardStats::default()))
    }

    async fn get_interview_history(&self) -> ApiResult<Vec<InterviewHistoryEntry>> {
        let scripted = self.history_response.lock().clone();
        scripted.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_checkout_session(&self, plan: &str) -> ApiResult<CheckoutSessionHandle> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.checkout_create_response.lock().clone();
        scripted.unwrap_or_else(|| {
            Ok(CheckoutSessionHandle {
                checkout_url: format!("https://checkout.example.com/{}/cs_test_1", plan),
                session_id: "cs_test_1".to_string(),
            })
        })
    }

    async fn get_subscription(&self) -> ApiResult<SubscriptionState> {
        let scripted = self.subscription_response.lock().clone();
        scripted.unwrap_or_else(|| Ok(active_subscription()))
    }

    async fn get_checkout_session(&self, session_id: &str) -> ApiResult<CheckoutSessionSnapshot> {
        let scripted = self.checkout_session_response.lock().clone();
        scripted.unwrap_or_else(|| {
            Ok(CheckoutSessionSnapshot {
                session_id: session_id.to_string(),
                status: "complete".to_string(),
                plan: Some(PlanId::Pro),
                customer_email: Some("jordan@example.com".to_string()),
                next_billing_date: None,
            })
        })
    }

    async fn cancel_subscription(&self) -> ApiResult<CancelConfirmation> {
        let scripted = self.cancel_response.lock().clone();
        scripted.unwrap_or_else(|| {
            Ok(CancelConfirmation {
                message: "Subscription will end at the close of the current period".to_string(),
                cancel_at: None,
            })
        })
    }
}

/// Convenience: fill every wizard step of a flow with valid answers and
/// walk it to the settings step.
pub fn complete_wizard(flow: &prepmate::InterviewFlow) {
    use prepmate::session::{Difficulty, InterviewType};

    flow.next_step().expect("leave resume step");
    flow.set_interview_type(InterviewType::Mixed);
    flow.next_step().expect("leave interview type step");
    flow.set_job_title("Backend Engineer");
    flow.next_step().expect("leave job details step");
    flow.set_difficulty(Difficulty::Intermediate);
    flow.next_step().expect("leave difficulty step");
}
