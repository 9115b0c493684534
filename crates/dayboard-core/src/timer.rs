//! Countdown timer reducer.
//!
//! The timer is a pure state machine over [`TimerState`]. It owns no clock or
//! thread; the caller feeds it one `Tick` per second while it is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Idle
//! Running --tick(remaining = 0)--> Idle (next phase, phase complete)
//! any --reset--> Idle(Work)
//! ```
//!
//! Commands that make no sense in the current state leave it unchanged.

use serde::{Deserialize, Serialize};

use crate::models::{Phase, TimerState, TimerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "minutes", rename_all = "snake_case")]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    Tick,
    ConfigureWork(u32),
    ConfigureBreak(u32),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEffect {
    /// The countdown for `completed` reached zero.
    PhaseComplete { completed: Phase },
}

/// Apply one command, returning the next state and any side effect.
pub fn reduce(state: TimerState, command: TimerCommand) -> (TimerState, Option<TimerEffect>) {
    match command {
        TimerCommand::Start => (
            TimerState {
                status: TimerStatus::Running,
                ..state
            },
            None,
        ),
        TimerCommand::Pause => (
            TimerState {
                status: TimerStatus::Idle,
                ..state
            },
            None,
        ),
        TimerCommand::Reset => (TimerState::new(state.work_minutes, state.break_minutes), None),
        TimerCommand::Tick => tick(state),
        TimerCommand::ConfigureWork(minutes) => (configure(state, Phase::Work, minutes), None),
        TimerCommand::ConfigureBreak(minutes) => (configure(state, Phase::Break, minutes), None),
    }
}

fn tick(state: TimerState) -> (TimerState, Option<TimerEffect>) {
    if !state.is_running() {
        return (state, None);
    }

    let remaining = state.remaining_seconds.saturating_sub(1);
    if remaining > 0 {
        return (
            TimerState {
                remaining_seconds: remaining,
                ..state
            },
            None,
        );
    }

    let next = state.phase.next();
    (
        TimerState {
            phase: next,
            status: TimerStatus::Idle,
            remaining_seconds: state.phase_seconds(next),
            ..state
        },
        Some(TimerEffect::PhaseComplete {
            completed: state.phase,
        }),
    )
}

fn configure(state: TimerState, phase: Phase, minutes: u32) -> TimerState {
    if minutes == 0 {
        return state;
    }

    let mut next = state;
    match phase {
        Phase::Work => next.work_minutes = minutes,
        Phase::Break => next.break_minutes = minutes,
    }

    // A running countdown keeps going on the old duration.
    if next.is_idle() && next.phase == phase {
        next.remaining_seconds = next.phase_seconds(phase);
    }
    next
}
