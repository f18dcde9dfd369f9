//! Messages exchanged between the console and the rest of the app.
//!
//! - Frontends -> console: statements to evaluate
//! - Console -> frontends: echoed input, results and diagnostics
//! - Console -> game systems: variable changes, clear requests

use bevy::prelude::*;

/// A line of input submitted to the console.
///
/// The line may hold several statements separated by `;`.
///
/// # Examples
///
/// ```ignore
/// fn submit(mut input: MessageWriter<ConsoleInputEvent>) {
///     input.write(ConsoleInputEvent::new("sv_gravity(400); print(1+2*3)"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw input line.
    pub command: String,
}

impl ConsoleInputEvent {
    /// Create a new input event.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// A line of console output.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ConsoleOutputEvent {
    /// The message text.
    pub message: String,
    /// What kind of line this is.
    pub level: ConsoleOutputLevel,
}

/// Kind of a console output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleOutputLevel {
    /// Diagnostic detail.
    Debug,
    /// Text printed by commands.
    #[default]
    Info,
    /// Warning.
    Warn,
    /// Failed statements.
    Error,
    /// Echo of the submitted statement.
    Command,
    /// Value a statement evaluated to.
    Result,
}

impl ConsoleOutputEvent {
    /// Create a new output event.
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    /// Create a debug message.
    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Debug, message)
    }

    /// Create an info message.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    /// Create a warning message.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Warn, message)
    }

    /// Create an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Error, message)
    }

    /// Create a command echo message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Command, message)
    }

    /// Create a result message.
    pub fn result(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Result, message)
    }
}

/// Sent after a variable command stored a different value.
///
/// # Examples
///
/// ```ignore
/// fn on_gravity_change(mut changes: MessageReader<ConVarChangedEvent>) {
///     for change in changes.read() {
///         if &*change.name == "sv_gravity" {
///             info!("Gravity changed to {}", change.new_value);
///         }
///     }
/// }
/// ```
#[derive(Message, Debug, Clone, PartialEq)]
pub struct ConVarChangedEvent {
    /// The variable command that was written.
    pub name: Box<str>,
    /// The old value in text form.
    pub old_value: String,
    /// The new value in text form.
    pub new_value: String,
}

impl ConVarChangedEvent {
    /// Create a new change event.
    pub fn new(
        name: impl Into<Box<str>>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }
}

/// Request for frontends to clear their output buffer.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ConsoleClearEvent;

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>()
            .add_message::<ConVarChangedEvent>()
            .add_message::<ConsoleClearEvent>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_input_event() {
        let event = ConsoleInputEvent::new("sv_gravity 400");
        assert_eq!(event.command, "sv_gravity 400");
    }

    #[test]
    fn test_console_output_event() {
        let event = ConsoleOutputEvent::error("unknown command: 'Foo'");
        assert_eq!(event.level, ConsoleOutputLevel::Error);
        assert_eq!(event.message, "unknown command: 'Foo'");
        assert_eq!(ConsoleOutputEvent::result("7").level, ConsoleOutputLevel::Result);
    }

    #[test]
    fn test_convar_changed_event() {
        let event = ConVarChangedEvent::new("sv_gravity", "800", "1000");
        assert_eq!(&*event.name, "sv_gravity");
        assert_eq!(event.old_value, "800");
        assert_eq!(event.new_value, "1000");
    }
}
