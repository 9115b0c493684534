//! Central event management and broadcasting

use tokio::sync::broadcast;

use crate::events::{DaemonEvent, HabitEvent, TaskEvent};
use crate::timer::TimerEvent;

/// Central event manager that coordinates all daemon events
pub struct EventManager {
    event_tx: broadcast::Sender<DaemonEvent>,
}

impl EventManager {
    /// Create a new event manager with a broadcast channel
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(1000);
        Self { event_tx }
    }

    /// Subscribe to all daemon events
    pub fn subscribe(&self) -> broadcast::Receiver<DaemonEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a timer event
    pub fn emit_timer(&self, event: TimerEvent) {
        let _ = self.event_tx.send(DaemonEvent::Timer(event));
    }

    /// Emit a task event
    pub fn emit_task(&self, event: TaskEvent) {
        tracing::debug!("EventManager: Broadcasting task event: {:?}", event.event_type);
        match self.event_tx.send(DaemonEvent::Task(event)) {
            Ok(count) => tracing::debug!("EventManager: Event sent to {} receivers", count),
            Err(_) => tracing::debug!("EventManager: No active subscribers for task event"),
        }
    }

    /// Emit a habit event
    pub fn emit_habit(&self, event: HabitEvent) {
        let _ = self.event_tx.send(DaemonEvent::Habit(event));
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
