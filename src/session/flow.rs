use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::wizard::{SetupStep, SetupWizard, WizardError};
use super::{
    clear_session_snapshot, load_session_snapshot, store_session_snapshot, Difficulty, FailedStage,
    InterviewType, LiveSession, ParsedResume, SessionPhase, SessionSnapshot, SetupState,
};
use crate::api::{ApiError, Backend, GenerateQuestionsRequest, ResumeUpload};
use crate::evaluation::{EvaluationProgress, EvaluationReport, EvaluationSubmission};
use crate::interview::{CountdownTimer, InterviewQuestion, TimerTick};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("operation not valid in phase {0}")]
    InvalidPhase(&'static str),
    #[error("another request is already in flight")]
    RequestInFlight,
}

/// Result of committing the current answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    Advanced { next_index: usize },
    /// That was the last question; the session is ready for `submit()`.
    ReadyToSubmit,
}

/// Result of one host-driven second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    LiveRunning { remaining_seconds: u32 },
    /// Time ran out; remaining questions were recorded as skipped and the
    /// session is ready for `submit()`.
    Expired,
    EvaluationRunning { percent: u8 },
}

struct FlowState {
    phase: SessionPhase,
    wizard: SetupWizard,
    frozen_setup: Option<SetupState>,
    frozen_resume: Option<ParsedResume>,
    session: Option<LiveSession>,
    timer: Option<CountdownTimer>,
    submission: Option<EvaluationSubmission>,
    progress: EvaluationProgress,
    report: Option<EvaluationReport>,
    in_flight: bool,
    // Bumped on abandon(); a response carrying an older epoch is dropped
    // instead of being applied to stale state.
    epoch: u64,
    question_started_elapsed: u32,
}

impl FlowState {
    fn fresh() -> Self {
        FlowState {
            phase: SessionPhase::Setup,
            wizard: SetupWizard::new(),
            frozen_setup: None,
            frozen_resume: None,
            session: None,
            timer: None,
            submission: None,
            progress: EvaluationProgress::new(),
            report: None,
            in_flight: false,
            epoch: 0,
            question_started_elapsed: 0,
        }
    }

    fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let timer = CountdownTimer::from_state(&snapshot.timer);
        let mut state = Self::fresh();
        state.phase = SessionPhase::Live;
        state.frozen_setup = Some(snapshot.setup);
        state.question_started_elapsed = timer.elapsed_seconds();
        state.session = Some(snapshot.session);
        state.timer = Some(timer);
        state
    }

    fn interview_type(&self) -> InterviewType {
        self.frozen_setup
            .as_ref()
            .and_then(|s| s.interview_type)
            .unwrap_or(InterviewType::Mixed)
    }

    fn freeze_submission(&mut self) {
        if let Some(session) = &self.session {
            let interview_type = self.interview_type();
            self.submission = Some(EvaluationSubmission::from_session(session, interview_type));
        }
    }
}

/// Drives one tab's interview pipeline:
/// `SETUP → GENERATING → LIVE → SUBMITTING → EVALUATING → DONE`, with a
/// retryable failure state reachable from the generation and evaluation
/// stages. All mutation happens under a short-lived lock that is never
/// held across an await; a single in-flight guard keeps the timer and the
/// manual finish from racing a second submission.
pub struct InterviewFlow {
    tab_id: String,
    backend: Arc<dyn Backend>,
    inner: Arc<Mutex<FlowState>>,
}

impl InterviewFlow {
    /// Create the flow for a tab, restoring a live session snapshot if one
    /// survived a reload.
    pub fn new(backend: Arc<dyn Backend>, tab_id: impl Into<String>) -> Self {
        let tab_id = tab_id.into();
        let state = match load_session_snapshot(&tab_id) {
            Some(snapshot) => {
                info!("♻️ Restored live session for tab {}", tab_id);
                FlowState::from_snapshot(snapshot)
            }
            None => FlowState::fresh(),
        };
        InterviewFlow {
            tab_id,
            backend,
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase.clone()
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    // ---- wizard ----------------------------------------------------------

    pub fn current_step(&self) -> SetupStep {
        self.inner.lock().wizard.current_step()
    }

    pub fn next_step(&self) -> Result<SetupStep, FlowError> {
        let mut state = self.inner.lock();
        Self::require_phase(&state.phase, &SessionPhase::Setup)?;
        Ok(state.wizard.next()?)
    }

    pub fn back_step(&self) -> SetupStep {
        self.inner.lock().wizard.back()
    }

    pub fn set_interview_type(&self, interview_type: InterviewType) {
        self.inner.lock().wizard.set_interview_type(interview_type);
    }

    pub fn set_job_title(&self, job_title: &str) {
        self.inner.lock().wizard.set_job_title(job_title);
    }

    pub fn set_company(&self, company: &str) {
        self.inner.lock().wizard.set_company(company);
    }

    pub fn set_industry(&self, industry: &str) {
        self.inner.lock().wizard.set_industry(industry);
    }

    pub fn set_experience_level(&self, experience: &str) {
        self.inner.lock().wizard.set_experience_level(experience);
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.inner.lock().wizard.set_difficulty(difficulty);
    }

    pub fn set_duration_minutes(&self, minutes: u32) -> Result<(), FlowError> {
        Ok(self.inner.lock().wizard.set_duration_minutes(minutes)?)
    }

    pub fn set_question_count(&self, count: u32) -> Result<(), FlowError> {
        Ok(self.inner.lock().wizard.set_question_count(count)?)
    }

    pub fn toggle_focus_area(&self, area: &str) {
        self.inner.lock().wizard.toggle_focus_area(area);
    }

    /// Upload a resume for backend-side extraction. Optional: a failure is
    /// reported to the caller but never blocks the wizard.
    pub async fn upload_resume(&self, upload: ResumeUpload) -> Result<(), FlowError> {
        match self.backend.parse_resume(upload).await {
            Ok(resume) => {
                self.inner.lock().wizard.attach_resume(resume);
                Ok(())
            }
            Err(e) => {
                warn!("Resume parse failed (wizard continues without it): {}", e);
                Err(e.into())
            }
        }
    }

    // ---- generation ------------------------------------------------------

    /// Freeze the wizard answers and request the question set. Occurs at
    /// most once per completed wizard: a successful generation leaves the
    /// setup phase behind for good.
    pub async fn start_generation(&self) -> Result<(), FlowError> {
        let (request, epoch) = {
            let mut state = self.inner.lock();
            Self::require_phase(&state.phase, &SessionPhase::Setup)?;
            if state.in_flight {
                return Err(FlowError::RequestInFlight);
            }
            let (setup, resume) = state.wizard.freeze()?;
            state.frozen_setup = Some(setup.clone());
            state.frozen_resume = resume.clone();
            state.phase = SessionPhase::Generating;
            state.in_flight = true;
            info!(
                "🚀 Generating {} questions for {}",
                setup.question_count,
                setup.job_title.as_deref().unwrap_or("(untitled role)")
            );
            (GenerateQuestionsRequest::from_setup(setup, resume), state.epoch)
        };
        self.run_generation(request, epoch).await
    }

    async fn run_generation(
        &self,
        request: GenerateQuestionsRequest,
        epoch: u64,
    ) -> Result<(), FlowError> {
        let duration_minutes = request.setup.duration_minutes;
        let result = self.backend.generate_questions(request).await;

        let mut state = self.inner.lock();
        if state.epoch != epoch {
            info!("Dropping stale generation response for tab {}", self.tab_id);
            return Ok(());
        }
        state.in_flight = false;

        let questions = match result {
            // All-or-nothing: an empty set is a generation failure.
            Ok(questions) if questions.is_empty() => {
                let error = ApiError::Backend {
                    message: "question generation returned no questions".to_string(),
                    detail: None,
                };
                state.phase = SessionPhase::Failed {
                    stage: FailedStage::Generation,
                    message: error.to_string(),
                };
                return Err(error.into());
            }
            Ok(questions) => questions,
            Err(e) => {
                state.phase = SessionPhase::Failed {
                    stage: FailedStage::Generation,
                    message: e.to_string(),
                };
                return Err(e.into());
            }
        };

        let session = LiveSession::new(Uuid::new_v4().to_string(), questions);
        let mut timer = CountdownTimer::new(duration_minutes);
        timer.start();
        info!(
            "✅ Session {} live with {} questions ({}s on the clock)",
            session.session_id,
            session.questions.len(),
            timer.remaining_seconds()
        );
        state.session = Some(session);
        state.timer = Some(timer);
        state.question_started_elapsed = 0;
        state.phase = SessionPhase::Live;
        Self::persist(&state, &self.tab_id);
        Ok(())
    }

    // ---- live session ----------------------------------------------------

    pub fn current_question(&self) -> Option<InterviewQuestion> {
        let state = self.inner.lock();
        state
            .session
            .as_ref()
            .and_then(|s| s.current_question().cloned())
    }

    pub fn session(&self) -> Option<LiveSession> {
        self.inner.lock().session.clone()
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        let state = self.inner.lock();
        state.timer.as_ref().map(|t| t.remaining_seconds())
    }

    pub fn is_recording(&self) -> bool {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(|s| s.recording)
            .unwrap_or(false)
    }

    /// Flip the recording flag. Two toggles are always a start/stop pair,
    /// never two starts. Returns the new value.
    pub fn toggle_recording(&self) -> Result<bool, FlowError> {
        let mut state = self.inner.lock();
        Self::require_phase(&state.phase, &SessionPhase::Live)?;
        let session = state.session.as_mut().ok_or(FlowError::InvalidPhase("live"))?;
        session.recording = !session.recording;
        let recording = session.recording;
        Self::persist(&state, &self.tab_id);
        Ok(recording)
    }

    /// Commit the current transcript (empty ⇒ skipped) and advance. On the
    /// last question this readies the session for `submit()`.
    pub fn advance(&self, transcript: &str) -> Result<AdvanceOutcome, FlowError> {
        let mut state = self.inner.lock();
        Self::require_phase(&state.phase, &SessionPhase::Live)?;

        let elapsed = state.timer.as_ref().map(|t| t.elapsed_seconds()).unwrap_or(0);
        let response_time = elapsed.saturating_sub(state.question_started_elapsed);
        state.question_started_elapsed = elapsed;

        let session = state.session.as_mut().ok_or(FlowError::InvalidPhase("live"))?;
        let more = session.commit_current(transcript, response_time);
        if more {
            let next_index = session.current_index;
            Self::persist(&state, &self.tab_id);
            Ok(AdvanceOutcome::Advanced { next_index })
        } else {
            self.enter_submitting(&mut state);
            Ok(AdvanceOutcome::ReadyToSubmit)
        }
    }

    /// Finish early: record every unanswered question as skipped and ready
    /// the session for `submit()`.
    pub fn finish_early(&self) -> Result<(), FlowError> {
        let mut state = self.inner.lock();
        Self::require_phase(&state.phase, &SessionPhase::Live)?;
        let session = state.session.as_mut().ok_or(FlowError::InvalidPhase("live"))?;
        session.skip_remaining();
        self.enter_submitting(&mut state);
        Ok(())
    }

    /// One host-driven second tick. Drives the countdown while live and
    /// the synthetic evaluation ramp while evaluating; inert elsewhere, so
    /// a tick arriving mid-submission can never trigger a second request.
    pub fn tick(&self) -> TickOutcome {
        let mut state = self.inner.lock();
        match state.phase {
            SessionPhase::Live => {
                let Some(timer) = state.timer.as_mut() else {
                    return TickOutcome::Idle;
                };
                match timer.tick() {
                    TimerTick::Running { remaining_seconds } => {
                        Self::persist(&state, &self.tab_id);
                        TickOutcome::LiveRunning { remaining_seconds }
                    }
                    TimerTick::Expired => {
                        info!("⌛ Interview time expired - skipping unanswered questions");
                        if let Some(session) = state.session.as_mut() {
                            session.skip_remaining();
                        }
                        self.enter_submitting(&mut state);
                        TickOutcome::Expired
                    }
                    TimerTick::Stopped => TickOutcome::Idle,
                }
            }
            SessionPhase::Evaluating => {
                state.progress.tick();
                TickOutcome::EvaluationRunning {
                    percent: state.progress.percent(),
                }
            }
            _ => TickOutcome::Idle,
        }
    }

    fn enter_submitting(&self, state: &mut FlowState) {
        if let Some(timer) = state.timer.as_mut() {
            timer.stop();
        }
        state.freeze_submission();
        state.phase = SessionPhase::Submitting;
    }

    // ---- evaluation ------------------------------------------------------

    /// Send the frozen transcript set for scoring. The in-flight guard
    /// makes this single-shot regardless of how the terminal live state was
    /// reached (manual finish or timer expiry).
    pub async fn submit(&self) -> Result<(), FlowError> {
        let (submission, epoch) = {
            let mut state = self.inner.lock();
            Self::require_phase(&state.phase, &SessionPhase::Submitting)?;
            if state.in_flight {
                return Err(FlowError::RequestInFlight);
            }
            let submission = state
                .submission
                .clone()
                .ok_or(FlowError::InvalidPhase("submitting"))?;
            state.in_flight = true;
            state.phase = SessionPhase::Evaluating;
            state.progress.resume();
            // The session no longer needs to survive a reload; the frozen
            // payload carries everything a retry needs.
            clear_session_snapshot(&self.tab_id);
            (submission, state.epoch)
        };

        let result = self.backend.submit_evaluation(submission).await;

        let mut state = self.inner.lock();
        if state.epoch != epoch {
            info!("Dropping stale evaluation response for tab {}", self.tab_id);
            return Ok(());
        }
        state.in_flight = false;
        match result {
            Ok(report) => {
                state.progress.complete();
                state.report = Some(report);
                state.session = None;
                state.timer = None;
                state.phase = SessionPhase::Done;
                info!("🏁 Evaluation complete for tab {}", self.tab_id);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                state.progress.fail(message.clone());
                state.phase = SessionPhase::Failed {
                    stage: FailedStage::Evaluation,
                    message,
                };
                Err(e.into())
            }
        }
    }

    /// Re-enter the stage a blocking operation failed from, keeping all
    /// collected input (wizard answers, transcripts).
    pub async fn retry(&self) -> Result<(), FlowError> {
        enum RetryPlan {
            Generation(GenerateQuestionsRequest, u64),
            Evaluation,
        }

        let plan = {
            let mut state = self.inner.lock();
            let stage = match &state.phase {
                SessionPhase::Failed { stage, .. } => *stage,
                other => return Err(FlowError::InvalidPhase(other.name())),
            };
            if state.in_flight {
                return Err(FlowError::RequestInFlight);
            }
            match stage {
                FailedStage::Generation => {
                    let setup = state
                        .frozen_setup
                        .clone()
                        .ok_or(FlowError::InvalidPhase("failed"))?;
                    let resume = state.frozen_resume.clone();
                    state.phase = SessionPhase::Generating;
                    state.in_flight = true;
                    info!("🔁 Retrying question generation");
                    RetryPlan::Generation(
                        GenerateQuestionsRequest::from_setup(setup, resume),
                        state.epoch,
                    )
                }
                FailedStage::Evaluation => {
                    state.phase = SessionPhase::Submitting;
                    state.progress.resume();
                    info!("🔁 Retrying evaluation submission");
                    RetryPlan::Evaluation
                }
            }
        };

        match plan {
            RetryPlan::Generation(request, epoch) => self.run_generation(request, epoch).await,
            RetryPlan::Evaluation => self.submit().await,
        }
    }

    pub fn report(&self) -> Option<EvaluationReport> {
        self.inner.lock().report.clone()
    }

    pub fn progress_percent(&self) -> u8 {
        self.inner.lock().progress.percent()
    }

    pub fn progress_stage(&self) -> &'static str {
        self.inner.lock().progress.stage()
    }

    pub fn last_error(&self) -> Option<String> {
        match &self.inner.lock().phase {
            SessionPhase::Failed { message, .. } => Some(message.clone()),
            _ => None,
        }
    }

    /// Navigation away: discard timers and session data, and make sure any
    /// response still in flight is ignored rather than applied to stale
    /// state.
    pub fn abandon(&self) {
        let mut state = self.inner.lock();
        let epoch = state.epoch + 1;
        let mut fresh = FlowState::fresh();
        fresh.epoch = epoch;
        *state = fresh;
        clear_session_snapshot(&self.tab_id);
        info!("👋 Session abandoned for tab {}", self.tab_id);
    }

    /// Spawn the recurring one-second tick that drives the countdown and
    /// the evaluation ramp. The task keeps ticking through the live,
    /// submitting and evaluating phases and ends with the outcome that
    /// stopped it - `Expired` when the countdown ran out (the host then
    /// drives `submit()`), `Idle` once the flow reaches a phase that
    /// consumes no ticks.
    pub fn spawn_ticker(self: Arc<Self>) -> tokio::task::JoinHandle<TickOutcome> {
        let flow = self;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                match flow.tick() {
                    TickOutcome::Expired => return TickOutcome::Expired,
                    TickOutcome::Idle => match flow.phase() {
                        SessionPhase::Live
                        | SessionPhase::Submitting
                        | SessionPhase::Evaluating => continue,
                        _ => return TickOutcome::Idle,
                    },
                    _ => continue,
                }
            }
        })
    }

    // ---- helpers ---------------------------------------------------------

    fn require_phase(found: &SessionPhase, expected: &SessionPhase) -> Result<(), FlowError> {
        if std::mem::discriminant(found) == std::mem::discriminant(expected) {
            Ok(())
        } else {
            Err(FlowError::InvalidPhase(found.name()))
        }
    }

    fn persist(state: &FlowState, tab_id: &str) {
        if state.phase != SessionPhase::Live {
            return;
        }
        let (Some(session), Some(timer), Some(setup)) =
            (&state.session, &state.timer, &state.frozen_setup)
        else {
            return;
        };
        store_session_snapshot(
            tab_id,
            SessionSnapshot {
                session: session.clone(),
                timer: timer.state(),
                setup: setup.clone(),
            },
        );
    }
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Setup => "setup",
            SessionPhase::Generating => "generating",
            SessionPhase::Live => "live",
            SessionPhase::Submitting => "submitting",
            SessionPhase::Evaluating => "evaluating",
            SessionPhase::Done => "done",
            SessionPhase::Failed { .. } => "failed",
        }
    }
}
