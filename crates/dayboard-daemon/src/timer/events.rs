//! Timer events

use chrono::{DateTime, Utc};
use dayboard_core::models::{Phase, TimerState};
use serde::{Deserialize, Serialize};

/// Event emitted by the timer engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerEvent {
    pub event_type: TimerEventType,
    pub timestamp: DateTime<Utc>,
}

/// Types of timer events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEventType {
    /// Countdown started or resumed
    Started { phase: Phase, remaining_seconds: u64 },
    /// Countdown paused with progress kept
    Paused { remaining_seconds: u64 },
    /// Back to the start of a work phase
    Reset { remaining_seconds: u64 },
    /// One second elapsed
    Tick { phase: Phase, remaining_seconds: u64 },
    /// A phase ran out; the alarm should sound
    PhaseCompleted { phase: Phase, next_phase: Phase },
    /// Phase durations changed
    Configured {
        work_minutes: u32,
        break_minutes: u32,
        remaining_seconds: u64,
    },
}

impl TimerEvent {
    /// Create a new timer event
    pub fn new(event_type: TimerEventType) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
        }
    }

    pub fn started(state: &TimerState) -> Self {
        Self::new(TimerEventType::Started {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
        })
    }

    pub fn tick(state: &TimerState) -> Self {
        Self::new(TimerEventType::Tick {
            phase: state.phase,
            remaining_seconds: state.remaining_seconds,
        })
    }

    pub fn phase_completed(phase: Phase, next_phase: Phase) -> Self {
        Self::new(TimerEventType::PhaseCompleted { phase, next_phase })
    }

    pub fn configured(state: &TimerState) -> Self {
        Self::new(TimerEventType::Configured {
            work_minutes: state.work_minutes,
            break_minutes: state.break_minutes,
            remaining_seconds: state.remaining_seconds,
        })
    }
}
