pub mod progress;

pub use progress::*;

use serde::{Deserialize, Serialize};

use crate::interview::InterviewQuestion;
use crate::session::{InterviewType, LiveSession};

/// The full question/transcript list shipped for scoring. Frozen at
/// submission time; a retry reuses the identical value, and the session id
/// lets the backend deduplicate resubmissions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EvaluationSubmission {
    pub session_id: String,
    pub interview_type: InterviewType,
    pub items: Vec<SubmissionItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SubmissionItem {
    pub question: InterviewQuestion,
    pub transcript: String,
    pub skipped: bool,
}

impl EvaluationSubmission {
    /// Marshal a terminal live session. Callers guarantee terminality;
    /// questions without a recorded answer are treated as skipped.
    pub fn from_session(session: &LiveSession, interview_type: InterviewType) -> Self {
        let items = session
            .questions
            .iter()
            .enumerate()
            .map(|(i, question)| match session.answers.get(i) {
                Some(answer) => SubmissionItem {
                    question: question.clone(),
                    transcript: answer.transcript.clone(),
                    skipped: answer.skipped,
                },
                None => SubmissionItem {
                    question: question.clone(),
                    transcript: String::new(),
                    skipped: true,
                },
            })
            .collect();

        EvaluationSubmission {
            session_id: session.session_id.clone(),
            interview_type,
            items,
        }
    }
}

/// Backend-computed scoring of a completed session. Produced exactly once
/// per logical submission; immutable after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    pub overall_score: f32,
    #[serde(default)]
    pub technical_score: Option<f32>,
    #[serde(default)]
    pub behavioral_score: Option<f32>,
    #[serde(default)]
    pub question_scores: Vec<QuestionScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuestionScore {
    pub question_id: String,
    pub score: f32,
    #[serde(default)]
    pub comment: Option<String>,
}
