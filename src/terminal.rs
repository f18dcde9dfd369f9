//! Terminal backend for headless/dedicated server console.
//!
//! Lines typed on stdin are submitted as console input and console output is
//! written to stdout.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use bevy::prelude::*;

use crate::core::{ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

/// Plugin that adds terminal (stdin/stdout) console support.
pub struct TerminalPlugin;

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        let _handle = spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .init_resource::<TerminalConfig>()
            .add_systems(Update, (read_stdin, write_stdout));
    }
}

/// Configuration for terminal behavior.
#[derive(Resource, Debug, Clone)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes).
    pub colored: bool,
    /// Lowest level written to stdout.
    pub min_level: ConsoleOutputLevel,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            colored: false,
            min_level: ConsoleOutputLevel::Info,
        }
    }
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let handle = stdin.lock();

        for line in handle.lines().map_while(Result::ok) {
            let text = line.trim().to_string();
            if !text.is_empty() && sender.send(text).is_err() {
                break;
            }
        }
    })
}

fn read_stdin(receiver: Res<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let rx = receiver.0.lock().unwrap_or_else(PoisonError::into_inner);
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}

fn write_stdout(mut events: MessageReader<ConsoleOutputEvent>, config: Res<TerminalConfig>) {
    let mut stdout = io::stdout().lock();
    for event in events.read() {
        if !is_shown(event.level, config.min_level) {
            continue;
        }
        let _ = if config.colored {
            writeln!(stdout, "{}{}\x1b[0m", color(event.level), event.message)
        } else {
            writeln!(stdout, "{}", event.message)
        };
    }
    let _ = stdout.flush();
}

// Command echoes and results are always shown.
fn is_shown(level: ConsoleOutputLevel, min_level: ConsoleOutputLevel) -> bool {
    match level {
        ConsoleOutputLevel::Command | ConsoleOutputLevel::Result => true,
        _ => severity(level) >= severity(min_level),
    }
}

fn severity(level: ConsoleOutputLevel) -> u8 {
    match level {
        ConsoleOutputLevel::Debug => 0,
        ConsoleOutputLevel::Info | ConsoleOutputLevel::Command | ConsoleOutputLevel::Result => 1,
        ConsoleOutputLevel::Warn => 2,
        ConsoleOutputLevel::Error => 3,
    }
}

fn color(level: ConsoleOutputLevel) -> &'static str {
    match level {
        ConsoleOutputLevel::Debug => "\x1b[90m",
        ConsoleOutputLevel::Info => "\x1b[0m",
        ConsoleOutputLevel::Warn => "\x1b[33m",
        ConsoleOutputLevel::Error => "\x1b[31m",
        ConsoleOutputLevel::Command => "\x1b[36m",
        ConsoleOutputLevel::Result => "\x1b[32m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        let min = ConsoleOutputLevel::Warn;
        assert!(!is_shown(ConsoleOutputLevel::Debug, min));
        assert!(!is_shown(ConsoleOutputLevel::Info, min));
        assert!(is_shown(ConsoleOutputLevel::Warn, min));
        assert!(is_shown(ConsoleOutputLevel::Error, min));
        assert!(is_shown(ConsoleOutputLevel::Command, min));
        assert!(is_shown(ConsoleOutputLevel::Result, min));
    }
}
