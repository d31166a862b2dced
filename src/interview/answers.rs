use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The candidate's recorded answer to one question. A skipped question
/// carries an empty transcript.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AnswerRecord {
    pub question_id: String,
    pub transcript: String,
    pub skipped: bool,
    pub response_time_secs: u32,
    pub answered_at: DateTime<Utc>,
}

impl AnswerRecord {
    pub fn answered(question_id: String, transcript: String, response_time_secs: u32) -> Self {
        AnswerRecord {
            question_id,
            transcript,
            skipped: false,
            response_time_secs,
            answered_at: Utc::now(),
        }
    }

    pub fn skipped(question_id: String) -> Self {
        AnswerRecord {
            question_id,
            transcript: String::new(),
            skipped: true,
            response_time_secs: 0,
            answered_at: Utc::now(),
        }
    }
}
