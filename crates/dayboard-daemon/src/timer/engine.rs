use dayboard_core::models::{TimerConfig, TimerState};
use dayboard_core::{TimerCommand, TimerEffect, reduce};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at};

use super::events::{TimerEvent, TimerEventType};
use crate::event_manager::EventManager;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the countdown reducer from a one-second tick task.
///
/// The tick task exists only while the timer is running. Each start from idle
/// gets a fresh one, and commands that stop the countdown abort it before
/// they return.
pub struct TimerEngine {
    state: RwLock<TimerState>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    event_manager: Arc<EventManager>,
}

impl TimerEngine {
    pub fn new(config: &TimerConfig, event_manager: Arc<EventManager>) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(TimerState::from(config)),
            ticker: Mutex::new(None),
            event_manager,
        })
    }

    pub async fn state(&self) -> TimerState {
        *self.state.read().await
    }

    pub async fn start(self: &Arc<Self>) -> TimerState {
        self.dispatch(TimerCommand::Start).await
    }

    pub async fn pause(self: &Arc<Self>) -> TimerState {
        self.dispatch(TimerCommand::Pause).await
    }

    pub async fn reset(self: &Arc<Self>) -> TimerState {
        self.dispatch(TimerCommand::Reset).await
    }

    pub async fn configure_work(self: &Arc<Self>, minutes: u32) -> TimerState {
        self.dispatch(TimerCommand::ConfigureWork(minutes)).await
    }

    pub async fn configure_break(self: &Arc<Self>, minutes: u32) -> TimerState {
        self.dispatch(TimerCommand::ConfigureBreak(minutes)).await
    }

    /// Apply a user command and start or stop the tick task to match.
    pub async fn dispatch(self: &Arc<Self>, command: TimerCommand) -> TimerState {
        let mut ticker = self.ticker.lock().await;
        let (before, after, effect) = self.apply(command).await;

        match (before.is_running(), after.is_running()) {
            (_, false) => {
                if let Some(handle) = ticker.take() {
                    handle.abort();
                }
            }
            (false, true) => {
                // A ticker left over from the last run may not have exited yet.
                if let Some(stale) = ticker.replace(self.spawn_ticker()) {
                    stale.abort();
                }
            }
            (true, true) => {}
        }
        drop(ticker);

        self.publish(command, &before, &after, effect);
        after
    }

    async fn apply(&self, command: TimerCommand) -> (TimerState, TimerState, Option<TimerEffect>) {
        let mut state = self.state.write().await;
        let before = *state;
        let (after, effect) = reduce(before, command);
        *state = after;
        (before, after, effect)
    }

    fn spawn_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::downgrade(self);
        tokio::spawn(async move {
            Self::tick_loop(engine, TICK_INTERVAL).await;
        })
    }

    async fn tick_loop(engine: Weak<Self>, period: Duration) {
        let mut ticks = interval_at(Instant::now() + period, period);

        loop {
            ticks.tick().await;

            let Some(engine) = engine.upgrade() else {
                break;
            };

            let (before, after, effect) = engine.apply(TimerCommand::Tick).await;
            engine.publish(TimerCommand::Tick, &before, &after, effect);

            if !after.is_running() {
                break;
            }
        }
    }

    fn publish(
        &self,
        command: TimerCommand,
        before: &TimerState,
        after: &TimerState,
        effect: Option<TimerEffect>,
    ) {
        if before == after {
            tracing::trace!("Timer ignored {:?} while {:?}", command, before.status);
            return;
        }

        let event = match command {
            TimerCommand::Start => TimerEvent::started(after),
            TimerCommand::Pause => TimerEvent::new(TimerEventType::Paused {
                remaining_seconds: after.remaining_seconds,
            }),
            TimerCommand::Reset => TimerEvent::new(TimerEventType::Reset {
                remaining_seconds: after.remaining_seconds,
            }),
            TimerCommand::ConfigureWork(_) | TimerCommand::ConfigureBreak(_) => {
                TimerEvent::configured(after)
            }
            TimerCommand::Tick => match effect {
                Some(TimerEffect::PhaseComplete { completed }) => {
                    tracing::info!("{} finished, next up: {}", completed.as_str(), after.phase.as_str());
                    TimerEvent::phase_completed(completed, after.phase)
                }
                None => {
                    tracing::trace!("Timer tick: {}", after.display());
                    TimerEvent::tick(after)
                }
            },
        };

        if !matches!(command, TimerCommand::Tick) {
            tracing::debug!("Timer {:?}: {} ({:?})", command, after.display(), after.status);
        }
        self.event_manager.emit_timer(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DaemonEvent;
    use dayboard_core::models::Phase;
    use tokio::sync::broadcast;
    use tokio::time::sleep;

    fn engine(work_minutes: u32, break_minutes: u32) -> (Arc<TimerEngine>, broadcast::Receiver<DaemonEvent>) {
        let events = Arc::new(EventManager::new());
        let receiver = events.subscribe();
        let config = TimerConfig {
            work_minutes,
            break_minutes,
        };
        (TimerEngine::new(&config, events), receiver)
    }

    fn timer_events(receiver: &mut broadcast::Receiver<DaemonEvent>) -> Vec<TimerEventType> {
        let mut out = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let DaemonEvent::Timer(event) = event {
                out.push(event.event_type);
            }
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_runs_while_started() {
        let (engine, _rx) = engine(25, 5);

        engine.start().await;
        sleep(Duration::from_millis(3500)).await;

        let state = engine.state().await;
        assert!(state.is_running());
        assert_eq!(state.remaining_seconds, 1497);

        engine.reset().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticking() {
        let (engine, _rx) = engine(25, 5);

        engine.start().await;
        sleep(Duration::from_millis(2500)).await;
        let paused = engine.pause().await;
        assert_eq!(paused.remaining_seconds, 1498);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(engine.state().await, paused);

        let resumed = engine.start().await;
        assert_eq!(resumed.remaining_seconds, 1498);
        engine.reset().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_completion_stops_and_notifies() {
        let (engine, mut rx) = engine(1, 2);

        engine.start().await;
        sleep(Duration::from_secs(75)).await;

        let state = engine.state().await;
        assert!(state.is_idle());
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.remaining_seconds, 120);

        let events = timer_events(&mut rx);
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, TimerEventType::PhaseCompleted { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![&TimerEventType::PhaseCompleted {
                phase: Phase::Work,
                next_phase: Phase::Break,
            }]
        );
        let ticks = events
            .iter()
            .filter(|e| matches!(e, TimerEventType::Tick { .. }))
            .count();
        assert_eq!(ticks, 59);

        // the next phase needs an explicit start
        engine.start().await;
        sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.state().await.remaining_seconds, 119);
        engine.reset().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_returns_to_work() {
        let (engine, _rx) = engine(25, 5);

        engine.start().await;
        sleep(Duration::from_secs(5)).await;
        let state = engine.reset().await;

        assert!(state.is_idle());
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_seconds, 1500);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(engine.state().await.remaining_seconds, 1500);
    }

    #[tokio::test]
    async fn test_configure_while_idle() {
        let (engine, mut rx) = engine(25, 5);

        let state = engine.configure_work(50).await;
        assert_eq!(state.remaining_seconds, 3000);

        assert!(matches!(
            timer_events(&mut rx).as_slice(),
            [TimerEventType::Configured {
                work_minutes: 50,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_ignored_commands_emit_nothing() {
        let (engine, mut rx) = engine(25, 5);

        engine.pause().await;
        engine.configure_break(0).await;
        assert!(timer_events(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_ticker() {
        let (engine, _rx) = engine(25, 5);

        engine.start().await;
        engine.start().await;
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(engine.state().await.remaining_seconds, 1498);
        engine.reset().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_lingering_ticker() {
        let (engine, _rx) = engine(25, 5);

        // a tick task that has not exited yet while the timer is idle
        *engine.ticker.lock().await = Some(tokio::spawn(std::future::pending::<()>()));

        engine.start().await;
        sleep(Duration::from_millis(2500)).await;

        let state = engine.state().await;
        assert!(state.is_running());
        assert_eq!(state.remaining_seconds, 1498);
        engine.reset().await;
    }
}
