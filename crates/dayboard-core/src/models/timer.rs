use serde::{Deserialize, Serialize};

use super::TimerConfig;

/// Countdown timer snapshot. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    pub status: TimerStatus,
    pub remaining_seconds: u64,
    pub work_minutes: u32,
    pub break_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
}

impl TimerState {
    /// Idle at the start of a work phase.
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            phase: Phase::Work,
            status: TimerStatus::Idle,
            remaining_seconds: u64::from(work_minutes) * 60,
            work_minutes,
            break_minutes,
        }
    }

    pub fn phase_seconds(&self, phase: Phase) -> u64 {
        let minutes = match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        };
        u64::from(minutes) * 60
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_idle(&self) -> bool {
        self.status == TimerStatus::Idle
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

impl Default for TimerState {
    fn default() -> Self {
        TimerConfig::default().into()
    }
}

impl From<&TimerConfig> for TimerState {
    fn from(config: &TimerConfig) -> Self {
        TimerState::new(config.work_minutes, config.break_minutes)
    }
}

impl From<TimerConfig> for TimerState {
    fn from(config: TimerConfig) -> Self {
        TimerState::from(&config)
    }
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work => "Work Session",
            Phase::Break => "Break Time",
        }
    }

    pub fn next(&self) -> Phase {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }
}
