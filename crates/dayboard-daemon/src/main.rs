//! Dayboard Daemon
//!
//! Hosts the cadence reset pass, habit streaks and the countdown timer over a
//! local record store, driven from a line-oriented console on stdin.

use anyhow::Result;
use clap::Parser;
use dayboard_core::models::{Habit, Task};
use dayboard_core::storage::{FileStore, RecordStore, init_data_dir};
use dayboard_core::SystemClock;
use dayboard_daemon::console::{Command, ConsoleError, HELP};
use dayboard_daemon::timer::TimerEventType;
use dayboard_daemon::{
    ConfigManager, Console, DaemonEvent, EventManager, HabitManager, TaskManager, TimerEngine,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "dayboardd")]
#[command(about = "Dayboard daemon - recurring tasks, habits and a focus timer", long_about = None)]
struct Args {
    /// Directory holding tasks.json, habits.json and daemon.log
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Run one cadence reset pass and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = Arc::new(ConfigManager::new()?);
    let config = config_manager.get().await;

    let data_dir = match &args.data_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir.clone()
        }
        None => init_data_dir()?,
    };
    let log_file_path = data_dir.join("daemon.log");

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    // Initialize logging - write to both file and stdout
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let stdout_writer = std::io::stdout.with_max_level(tracing::Level::INFO);
    let file_writer = log_file.with_max_level(tracing::Level::DEBUG);
    let log_level = args.log_level.as_deref().unwrap_or(&config.daemon.log_level);

    tracing_subscriber::fmt()
        .with_writer(stdout_writer.and(file_writer))
        .with_env_filter(log_level)
        .with_ansi(false) // No color codes in log file
        .init();

    tracing::info!("Dayboard daemon starting...");
    tracing::info!("Data directory: {}", data_dir.display());
    tracing::info!("Log file: {}", log_file_path.display());

    let store = Arc::new(FileStore::new(data_dir));
    let clock = Arc::new(SystemClock);
    let event_manager = Arc::new(EventManager::new());

    let task_manager = Arc::new(TaskManager::new(
        store.clone(),
        clock.clone(),
        event_manager.clone(),
    ));
    let habit_manager = Arc::new(HabitManager::new(
        store.clone(),
        clock,
        event_manager.clone(),
    ));
    let timer_engine = TimerEngine::new(&config.timer, event_manager.clone());

    // Activation pass. A failure is logged and the daemon keeps running.
    match task_manager.run_resets().await {
        Ok(reset) => tracing::info!("Activation reset pass: {} tasks reset", reset.len()),
        Err(e) => tracing::error!("Activation reset pass failed: {}", e),
    }

    if args.once {
        return Ok(());
    }

    let _task_subscription = store.subscribe::<Task, _>(|tasks: &[Task]| {
        let done = tasks.iter().filter(|t| t.completed).count();
        tracing::debug!("Tasks changed: {}/{} completed", done, tasks.len());
    })?;
    let _habit_subscription = store.subscribe::<Habit, _>(|habits: &[Habit]| {
        tracing::debug!("Habits changed: {} tracked", habits.len());
    })?;

    let period = Duration::from_secs(config.daemon.reset_check_minutes * 60);
    let reset_handle = task_manager.clone().spawn_reset_loop(period);
    tracing::info!(
        "Reset pass re-checks every {} minutes",
        config.daemon.reset_check_minutes
    );

    let alarm_handle = spawn_alarm(&event_manager);
    let console = Console::new(
        config_manager,
        timer_engine.clone(),
        task_manager,
        habit_manager,
    );

    tracing::info!("Daemon ready, type 'help' for commands");

    tokio::select! {
        result = run_console(&console) => result?,
        result = tokio::signal::ctrl_c() => result?,
    }

    tracing::info!("Shutting down...");
    timer_engine.pause().await;
    reset_handle.abort();
    alarm_handle.abort();

    Ok(())
}

async fn run_console(console: &Console<FileStore, SystemClock>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let reply = match line.parse::<Command>() {
            Ok(command) => console.handle(command).await,
            Err(e) => Err(e),
        };

        match reply {
            Ok(text) => println!("{}", text),
            Err(e @ ConsoleError::UnknownCommand(_)) => println!("{}\n{}", e, HELP),
            Err(e) => println!("error: {}", e),
        }
    }

    Ok(())
}

/// Ring the terminal bell whenever a timer phase runs out.
fn spawn_alarm(event_manager: &EventManager) -> tokio::task::JoinHandle<()> {
    let mut events = event_manager.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(DaemonEvent::Timer(event)) => {
                    if let TimerEventType::PhaseCompleted { phase, next_phase } = event.event_type {
                        println!(
                            "\x07{} complete. Start {} when ready.",
                            phase.as_str(),
                            next_phase.as_str()
                        );
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Alarm listener lagged, skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
