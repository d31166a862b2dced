use log::info;
use serde::{Deserialize, Serialize};

/// Snapshot of the countdown for display and session persistence.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TimerState {
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub running: bool,
}

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Running { remaining_seconds: u32 },
    Expired,
    Stopped,
}

/// Countdown over the configured interview duration. The host delivers one
/// `tick()` per second; the timer itself never spawns tasks, so expiry is
/// deterministic under test. Zero is terminal: further ticks stay at zero
/// and keep reporting `Expired`.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    total_seconds: u32,
    remaining_seconds: u32,
    running: bool,
}

impl CountdownTimer {
    pub fn new(duration_minutes: u32) -> Self {
        let total_seconds = duration_minutes * 60;
        CountdownTimer {
            total_seconds,
            remaining_seconds: total_seconds,
            running: false,
        }
    }

    pub fn start(&mut self) {
        if !self.running && self.remaining_seconds > 0 {
            self.running = true;
            info!("⏱️ Countdown started: {}s remaining", self.remaining_seconds);
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!("⏹️ Countdown stopped at {}s remaining", self.remaining_seconds);
        }
    }

    pub fn tick(&mut self) -> TimerTick {
        if !self.running {
            return TimerTick::Stopped;
        }
        if self.remaining_seconds == 0 {
            return TimerTick::Expired;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.running = false;
            info!("⌛ Countdown expired");
            TimerTick::Expired
        } else {
            TimerTick::Running {
                remaining_seconds: self.remaining_seconds,
            }
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            total_seconds: self.total_seconds,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
        }
    }

    /// Rebuild a timer from a persisted snapshot (page reload within a tab).
    pub fn from_state(state: &TimerState) -> Self {
        CountdownTimer {
            total_seconds: state.total_seconds,
            remaining_seconds: state.remaining_seconds.min(state.total_seconds),
            running: state.running && state.remaining_seconds > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_minutes_starts_at_1800_seconds() {
        let timer = CountdownTimer::new(30);
        assert_eq!(timer.remaining_seconds(), 1800);
        assert!(!timer.is_running());
    }

    #[test]
    fn tick_decrements_once_per_call() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        assert_eq!(
            timer.tick(),
            TimerTick::Running {
                remaining_seconds: 59
            }
        );
        assert_eq!(timer.elapsed_seconds(), 1);
    }

    #[test]
    fn tick_is_inert_while_stopped() {
        let mut timer = CountdownTimer::new(1);
        assert_eq!(timer.tick(), TimerTick::Stopped);
        assert_eq!(timer.remaining_seconds(), 60);
    }

    #[test]
    fn expiry_is_terminal_and_idempotent() {
        let mut timer = CountdownTimer::new(1);
        timer.start();
        for _ in 0..59 {
            timer.tick();
        }
        assert_eq!(timer.tick(), TimerTick::Expired);
        assert_eq!(timer.remaining_seconds(), 0);
        assert!(!timer.is_running());
        // A second toggle of start must not resurrect an expired timer.
        timer.start();
        assert_eq!(timer.tick(), TimerTick::Stopped);
    }

    #[test]
    fn snapshot_round_trip_clamps_bad_data() {
        let mut timer = CountdownTimer::new(15);
        timer.start();
        timer.tick();
        let restored = CountdownTimer::from_state(&timer.state());
        assert_eq!(restored.remaining_seconds(), timer.remaining_seconds());
        assert!(restored.is_running());

        let bogus = TimerState {
            total_seconds: 60,
            remaining_seconds: 600,
            running: true,
        };
        assert_eq!(CountdownTimer::from_state(&bogus).remaining_seconds(), 60);
    }
}
