use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    Difficulty, InterviewType, ParsedResume, SetupState, DURATION_CHOICES, MAX_QUESTION_COUNT,
    MIN_QUESTION_COUNT,
};

/// Ordered wizard steps. Forward motion is gated by the current step's
/// validity predicate; backward motion never re-validates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SetupStep {
    Resume,
    InterviewType,
    JobDetails,
    Difficulty,
    Settings,
}

impl SetupStep {
    pub const ALL: [SetupStep; 5] = [
        SetupStep::Resume,
        SetupStep::InterviewType,
        SetupStep::JobDetails,
        SetupStep::Difficulty,
        SetupStep::Settings,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    fn next(&self) -> Option<SetupStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn prev(&self) -> Option<SetupStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("select an interview type to continue")]
    InterviewTypeMissing,
    #[error("enter a job title to continue")]
    JobTitleMissing,
    #[error("select a difficulty to continue")]
    DifficultyMissing,
    #[error("{0} minutes is not an available duration")]
    InvalidDuration(u32),
    #[error("question count must be between {MIN_QUESTION_COUNT} and {MAX_QUESTION_COUNT}")]
    InvalidQuestionCount(u32),
    #[error("setup is already on the last step")]
    AlreadyAtEnd,
}

/// The five-step setup wizard preceding question generation. Owns the
/// mutable [`SetupState`] and the optional parsed resume; both are frozen
/// together when the final step completes.
#[derive(Debug, Clone)]
pub struct SetupWizard {
    step: SetupStep,
    state: SetupState,
    resume: Option<ParsedResume>,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupWizard {
    pub fn new() -> Self {
        SetupWizard {
            step: SetupStep::Resume,
            state: SetupState::default(),
            resume: None,
        }
    }

    pub fn current_step(&self) -> SetupStep {
        self.step
    }

    pub fn state(&self) -> &SetupState {
        &self.state
    }

    pub fn resume(&self) -> Option<&ParsedResume> {
        self.resume.as_ref()
    }

    pub fn attach_resume(&mut self, resume: ParsedResume) {
        info!("📄 Resume attached ({} skills parsed)", resume.skills.len());
        self.resume = Some(resume);
    }

    pub fn clear_resume(&mut self) {
        self.resume = None;
    }

    pub fn set_interview_type(&mut self, interview_type: InterviewType) {
        self.state.interview_type = Some(interview_type);
    }

    pub fn set_job_title(&mut self, job_title: &str) {
        let trimmed = job_title.trim();
        self.state.job_title = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_company(&mut self, company: &str) {
        let trimmed = company.trim();
        self.state.company = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_industry(&mut self, industry: &str) {
        let trimmed = industry.trim();
        self.state.industry = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_experience_level(&mut self, experience: &str) {
        let trimmed = experience.trim();
        self.state.experience_level = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.state.difficulty = Some(difficulty);
    }

    pub fn set_duration_minutes(&mut self, minutes: u32) -> Result<(), WizardError> {
        if !DURATION_CHOICES.contains(&minutes) {
            return Err(WizardError::InvalidDuration(minutes));
        }
        self.state.duration_minutes = minutes;
        Ok(())
    }

    pub fn set_question_count(&mut self, count: u32) -> Result<(), WizardError> {
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count) {
            return Err(WizardError::InvalidQuestionCount(count));
        }
        self.state.question_count = count;
        Ok(())
    }

    pub fn toggle_focus_area(&mut self, area: &str) {
        let area = area.trim();
        if area.is_empty() {
            return;
        }
        if let Some(pos) = self.state.focus_areas.iter().position(|a| a == area) {
            self.state.focus_areas.remove(pos);
        } else {
            self.state.focus_areas.push(area.to_string());
        }
    }

    /// Validity predicate for one step. The resume step is always valid;
    /// the settings step re-checks values that could only have been set
    /// through the validating setters, so a default state passes.
    fn step_valid(&self, step: SetupStep) -> Result<(), WizardError> {
        match step {
            SetupStep::Resume => Ok(()),
            SetupStep::InterviewType => match self.state.interview_type {
                Some(_) => Ok(()),
                None => Err(WizardError::InterviewTypeMissing),
            },
            SetupStep::JobDetails => match self.state.job_title.as_deref() {
                Some(title) if !title.trim().is_empty() => Ok(()),
                _ => Err(WizardError::JobTitleMissing),
            },
            SetupStep::Difficulty => match self.state.difficulty {
                Some(_) => Ok(()),
                None => Err(WizardError::DifficultyMissing),
            },
            SetupStep::Settings => {
                if !DURATION_CHOICES.contains(&self.state.duration_minutes) {
                    return Err(WizardError::InvalidDuration(self.state.duration_minutes));
                }
                if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&self.state.question_count) {
                    return Err(WizardError::InvalidQuestionCount(self.state.question_count));
                }
                Ok(())
            }
        }
    }

    /// Advance to the next step after validating the current one.
    pub fn next(&mut self) -> Result<SetupStep, WizardError> {
        self.step_valid(self.step)?;
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(next)
            }
            None => Err(WizardError::AlreadyAtEnd),
        }
    }

    /// Go back one step. Always permitted; never re-validates. A no-op on
    /// the first step.
    pub fn back(&mut self) -> SetupStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// True once the wizard sits on the last step with every step valid.
    pub fn is_complete(&self) -> bool {
        self.step == SetupStep::Settings
            && SetupStep::ALL.iter().all(|s| self.step_valid(*s).is_ok())
    }

    /// Validate all steps and freeze the answers for generation.
    pub fn freeze(&self) -> Result<(SetupState, Option<ParsedResume>), WizardError> {
        for step in SetupStep::ALL {
            self.step_valid(step)?;
        }
        Ok((self.state.clone(), self.resume.clone()))
    }
}
