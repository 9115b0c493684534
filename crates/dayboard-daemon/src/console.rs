//! Line-oriented command surface read from stdin by `dayboardd`.

use std::str::FromStr;
use std::sync::Arc;

use dayboard_core::Clock;
use dayboard_core::models::{Cadence, ShiftPattern, group_by_cadence};
use dayboard_core::storage::RecordStore;

use crate::config::{ConfigManager, ConfigManagerError};
use crate::habit::{HabitManager, HabitManagerError};
use crate::task::{TaskManager, TaskManagerError};
use crate::timer::TimerEngine;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Task(#[from] TaskManagerError),

    #[error(transparent)]
    Habit(#[from] HabitManagerError),

    #[error(transparent)]
    Config(#[from] ConfigManagerError),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Work(u32),
    Break(u32),
    Status,
    Tasks(ShiftPattern),
    Habits,
    Toggle(String),
    Done(String),
    AddTask { cadence: Cadence, text: String },
    AddHabit(String),
    RemoveTask(String),
    RemoveHabit(String),
    ResetPass,
    Help,
}

pub const HELP: &str = "\
commands:
  start | pause | reset          control the timer
  work <min> | break <min>       set and save phase duration
  status                         show the timer
  tasks [shift]                  list tasks by cadence
  habits                         list habits
  add-task <cadence> <text>      cadence: daily, weekly, bi-weekly, monthly
  add-habit <text>
  toggle <task-id>               flip a task's completed flag
  done <habit-id>                mark a habit done today
  rm-task <id> | rm-habit <id>
  check                          run the cadence reset pass now
  quit";

impl FromStr for Command {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "start" => Command::Start,
            "pause" => Command::Pause,
            "reset" => Command::Reset,
            "work" => Command::Work(parse_minutes(rest)?),
            "break" => Command::Break(parse_minutes(rest)?),
            "status" => Command::Status,
            "tasks" => Command::Tasks(parse_shift(rest)?),
            "habits" => Command::Habits,
            "toggle" => Command::Toggle(required(rest, "task id")?),
            "done" => Command::Done(required(rest, "habit id")?),
            "add-task" => {
                let (cadence, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| ConsoleError::InvalidArgs("usage: add-task <cadence> <text>".into()))?;
                let cadence = cadence
                    .parse::<Cadence>()
                    .map_err(|e| ConsoleError::InvalidArgs(e.to_string()))?;
                Command::AddTask {
                    cadence,
                    text: text.trim().to_string(),
                }
            }
            "add-habit" => Command::AddHabit(required(rest, "habit text")?),
            "rm-task" => Command::RemoveTask(required(rest, "task id")?),
            "rm-habit" => Command::RemoveHabit(required(rest, "habit id")?),
            "check" => Command::ResetPass,
            "help" | "?" => Command::Help,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

fn required(rest: &str, what: &str) -> Result<String> {
    if rest.is_empty() {
        return Err(ConsoleError::InvalidArgs(format!("missing {}", what)));
    }
    Ok(rest.to_string())
}

fn parse_minutes(rest: &str) -> Result<u32> {
    rest.parse()
        .map_err(|_| ConsoleError::InvalidArgs(format!("expected minutes, got '{}'", rest)))
}

fn parse_shift(rest: &str) -> Result<ShiftPattern> {
    if rest.is_empty() {
        return Ok(ShiftPattern::default());
    }
    ShiftPattern::ALL
        .iter()
        .copied()
        .find(|shift| shift.id().eq_ignore_ascii_case(rest))
        .ok_or_else(|| ConsoleError::InvalidArgs(format!("unknown shift pattern '{}'", rest)))
}

/// Routes parsed commands to the managers and renders a plain-text reply.
pub struct Console<S, C> {
    config: Arc<ConfigManager>,
    timer: Arc<TimerEngine>,
    tasks: Arc<TaskManager<S, C>>,
    habits: Arc<HabitManager<S, C>>,
}

impl<S: RecordStore + 'static, C: Clock + 'static> Console<S, C> {
    pub fn new(
        config: Arc<ConfigManager>,
        timer: Arc<TimerEngine>,
        tasks: Arc<TaskManager<S, C>>,
        habits: Arc<HabitManager<S, C>>,
    ) -> Self {
        Self {
            config,
            timer,
            tasks,
            habits,
        }
    }

    pub async fn handle(&self, command: Command) -> Result<String> {
        tracing::debug!("Console command: {:?}", command);

        let reply = match command {
            Command::Start => self.timer_line(self.timer.start().await),
            Command::Pause => self.timer_line(self.timer.pause().await),
            Command::Reset => self.timer_line(self.timer.reset().await),
            Command::Work(minutes) => {
                self.config.update_timer_config(Some(minutes), None).await?;
                self.timer_line(self.timer.configure_work(minutes).await)
            }
            Command::Break(minutes) => {
                self.config.update_timer_config(None, Some(minutes)).await?;
                self.timer_line(self.timer.configure_break(minutes).await)
            }
            Command::Status => self.timer_line(self.timer.state().await),
            Command::Tasks(shift) => {
                let tasks = self.tasks.list_for_shift(shift).await?;
                let mut out = format!("{} ({} tasks)", shift.label(), tasks.len());
                for (cadence, group) in group_by_cadence(&tasks, shift) {
                    out.push_str(&format!("\n{}:", cadence));
                    for task in group {
                        let mark = if task.completed { "x" } else { " " };
                        out.push_str(&format!("\n  [{}] {}  {}", mark, task.text, task.id));
                    }
                }
                out
            }
            Command::Habits => {
                let habits = self.habits.list().await?;
                let today = self.habits.today();
                let mut out = format!("{} habits", habits.len());
                for habit in habits {
                    let mark = if habit.is_completed_on(today) { "x" } else { " " };
                    out.push_str(&format!(
                        "\n  [{}] {:>3}  {}  {}",
                        mark, habit.streak, habit.text, habit.id
                    ));
                }
                out
            }
            Command::Toggle(id) => {
                let task = self.tasks.toggle(&id).await?;
                let state = if task.completed { "done" } else { "open" };
                format!("{}: {}", task.text, state)
            }
            Command::Done(id) => {
                let habit = self.habits.complete(&id).await?;
                format!("{}: streak {}", habit.text, habit.streak)
            }
            Command::AddTask { cadence, text } => {
                let task = self
                    .tasks
                    .create(text, cadence, ShiftPattern::default())
                    .await?;
                format!("added {} task {}", task.cadence, task.id)
            }
            Command::AddHabit(text) => {
                let habit = self.habits.create(text).await?;
                format!("added habit {}", habit.id)
            }
            Command::RemoveTask(id) => {
                self.tasks.delete(&id).await?;
                format!("removed task {}", id)
            }
            Command::RemoveHabit(id) => {
                self.habits.delete(&id).await?;
                format!("removed habit {}", id)
            }
            Command::ResetPass => {
                let reset = self.tasks.run_resets().await?;
                format!("{} tasks reset", reset.len())
            }
            Command::Help => HELP.to_string(),
        };

        Ok(reply)
    }

    fn timer_line(&self, state: dayboard_core::models::TimerState) -> String {
        format!(
            "{} {} ({:?})",
            state.phase.as_str(),
            state.display(),
            state.status
        )
    }
}
