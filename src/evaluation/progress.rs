use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The ramp stalls here until the terminal response arrives.
const RAMP_CAP: u8 = 90;
const RAMP_STEP_MIN: u8 = 2;
const RAMP_STEP_MAX: u8 = 7;

/// Synthetic progress shown while scoring runs backend-side. Purely
/// presentational: the value reassures the user that work is ongoing and
/// carries no protocol meaning. Monotonically non-decreasing, including
/// across retries: a retry resumes from the frozen value rather than
/// restarting at zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationProgress {
    percent: u8,
    frozen: bool,
    completed: bool,
    error: Option<String>,
}

impl Default for EvaluationProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationProgress {
    pub fn new() -> Self {
        EvaluationProgress {
            percent: 0,
            frozen: false,
            completed: false,
            error: None,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Coarse stage label for display.
    pub fn stage(&self) -> &'static str {
        match self.percent {
            0..=19 => "Preparing",
            20..=79 => "Analyzing",
            _ => "Finalizing",
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Advance the ramp by a bounded random step. Inert once frozen,
    /// completed, or sitting at the cap.
    pub fn tick(&mut self) {
        let step = rand::thread_rng().gen_range(RAMP_STEP_MIN..=RAMP_STEP_MAX);
        self.advance_by(step);
    }

    fn advance_by(&mut self, step: u8) {
        if self.frozen || self.completed {
            return;
        }
        self.percent = self.percent.saturating_add(step).min(RAMP_CAP);
    }

    /// Terminal response arrived: snap to 100.
    pub fn complete(&mut self) {
        self.percent = 100;
        self.completed = true;
        self.frozen = false;
        self.error = None;
        info!("Evaluation progress complete");
    }

    /// Scoring failed: freeze the ramp and keep the message verbatim.
    pub fn fail(&mut self, message: String) {
        self.frozen = true;
        self.error = Some(message);
    }

    /// Retry issued: unfreeze without losing accumulated progress.
    pub fn resume(&mut self) {
        self.frozen = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_is_monotonic_and_capped_below_100() {
        let mut progress = EvaluationProgress::new();
        let mut last = 0;
        for _ in 0..200 {
            progress.tick();
            assert!(progress.percent() >= last);
            last = progress.percent();
        }
        assert_eq!(progress.percent(), RAMP_CAP);
        assert!(!progress.is_completed());
    }

    #[test]
    fn stage_labels_follow_thresholds() {
        let mut progress = EvaluationProgress::new();
        assert_eq!(progress.stage(), "Preparing");
        progress.advance_by(19);
        assert_eq!(progress.stage(), "Preparing");
        progress.advance_by(1);
        assert_eq!(progress.stage(), "Analyzing");
        progress.advance_by(59);
        assert_eq!(progress.stage(), "Analyzing");
        progress.advance_by(1);
        assert_eq!(progress.stage(), "Finalizing");
    }

    #[test]
    fn failure_freezes_and_retry_resumes_without_reset() {
        let mut progress = EvaluationProgress::new();
        progress.advance_by(40);
        progress.fail("scoring backend unavailable".to_string());
        let frozen_at = progress.percent();
        progress.tick();
        assert_eq!(progress.percent(), frozen_at);
        assert_eq!(progress.error(), Some("scoring backend unavailable"));

        progress.resume();
        assert!(progress.error().is_none());
        progress.advance_by(5);
        assert_eq!(progress.percent(), frozen_at + 5);
    }

    #[test]
    fn completion_snaps_to_100() {
        let mut progress = EvaluationProgress::new();
        progress.advance_by(33);
        progress.complete();
        assert_eq!(progress.percent(), 100);
        assert_eq!(progress.stage(), "Finalizing");
        // Ticks after completion change nothing.
        progress.tick();
        assert_eq!(progress.percent(), 100);
    }
}
