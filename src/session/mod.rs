pub mod flow;
pub mod wizard;

pub use flow::*;
pub use wizard::*;

use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::interview::{AnswerRecord, InterviewQuestion, TimerState};

/// Durations (minutes) a candidate may pick in the settings step.
pub const DURATION_CHOICES: [u32; 4] = [15, 30, 45, 60];
pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 20;

// Transient per-tab session snapshots. Survives a reload within one tab;
// tabs never observe each other's entries.
lazy_static! {
    static ref SESSION_SNAPSHOTS: Arc<Mutex<HashMap<String, SessionSnapshot>>> =
        Arc::new(Mutex::new(HashMap::new()));
}

pub fn store_session_snapshot(tab_id: &str, snapshot: SessionSnapshot) {
    let mut snapshots = SESSION_SNAPSHOTS.lock();
    snapshots.insert(tab_id.to_string(), snapshot);
}

pub fn load_session_snapshot(tab_id: &str) -> Option<SessionSnapshot> {
    let snapshots = SESSION_SNAPSHOTS.lock();
    snapshots.get(tab_id).cloned()
}

pub fn clear_session_snapshot(tab_id: &str) -> Option<SessionSnapshot> {
    let mut snapshots = SESSION_SNAPSHOTS.lock();
    snapshots.remove(tab_id)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Technical,
    Behavioral,
    Both,
    Mixed,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Behavioral => "behavioral",
            InterviewType::Both => "both",
            InterviewType::Mixed => "mixed",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Wizard answers, mutated per step and frozen at generation time.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SetupState {
    pub interview_type: Option<InterviewType>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub duration_minutes: u32,
    pub question_count: u32,
    pub focus_areas: Vec<String>,
}

impl Default for SetupState {
    fn default() -> Self {
        SetupState {
            interview_type: None,
            job_title: None,
            company: None,
            industry: None,
            experience_level: None,
            difficulty: None,
            duration_minutes: 30,
            question_count: 5,
            focus_areas: Vec::new(),
        }
    }
}

/// Structured candidate profile extracted from an uploaded resume.
/// Extraction happens backend-side; this is never mutated after parse.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ParsedResume {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub projects: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub year: Option<String>,
}

/// Stage a blocking operation failed in. Retry re-enters the same stage
/// without discarding collected input.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailedStage {
    Generation,
    Evaluation,
}

/// The session phase tag. Transitions are driven exclusively by
/// [`flow::InterviewFlow`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "phase")]
pub enum SessionPhase {
    Setup,
    Generating,
    Live,
    Submitting,
    Evaluating,
    Done,
    Failed { stage: FailedStage, message: String },
}

/// The live-session aggregate: ordered question/answer records, cursor,
/// countdown state and the recording flag.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LiveSession {
    pub session_id: String,
    pub questions: Vec<InterviewQuestion>,
    pub answers: Vec<AnswerRecord>,
    pub current_index: usize,
    pub recording: bool,
}

impl LiveSession {
    pub fn new(session_id: String, questions: Vec<InterviewQuestion>) -> Self {
        LiveSession {
            session_id,
            questions,
            answers: Vec::new(),
            current_index: 0,
            recording: false,
        }
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    /// Every question answered or skipped.
    pub fn is_terminal(&self) -> bool {
        self.answers.len() == self.questions.len()
    }

    /// Commit the transcript for the current question and advance the
    /// cursor. An empty transcript is recorded as a skip. Returns false
    /// once the cursor has passed the last question.
    pub fn commit_current(&mut self, transcript: &str, response_time_secs: u32) -> bool {
        let Some(question) = self.questions.get(self.current_index) else {
            return false;
        };
        let trimmed = transcript.trim();
        let record = if trimmed.is_empty() {
            AnswerRecord::skipped(question.id.clone())
        } else {
            AnswerRecord::answered(question.id.clone(), trimmed.to_string(), response_time_secs)
        };
        self.answers.push(record);
        self.current_index += 1;
        self.recording = false;
        self.current_index < self.questions.len()
    }

    /// Record every not-yet-answered question as skipped with an empty
    /// transcript (timer expiry or early finish).
    pub fn skip_remaining(&mut self) {
        while self.answers.len() < self.questions.len() {
            let question = &self.questions[self.answers.len()];
            self.answers.push(AnswerRecord::skipped(question.id.clone()));
        }
        self.current_index = self.questions.len();
        self.recording = false;
    }
}

/// Serializable snapshot persisted to the per-tab store after each live
/// mutation and cleared at submission.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionSnapshot {
    pub session: LiveSession,
    pub timer: TimerState,
    pub setup: SetupState,
}
