use serde::{Deserialize, Serialize};

use crate::session::Difficulty;

/// A single generated interview question. Immutable once generated; the
/// ordered question list is the contract between generation and the live
/// session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InterviewQuestion {
    pub id: String,
    pub number: u32,
    pub text: String,
    pub category: QuestionCategory,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub focus_area: Option<String>,
}

/// Category tag on an individual question. A `both`/`mixed` interview
/// produces questions of either category.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Behavioral,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Technical => "technical",
            QuestionCategory::Behavioral => "behavioral",
        }
    }
}
