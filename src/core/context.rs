//! Per-statement evaluation state.
//!
//! Handlers only get shared access to the registry while a statement runs.
//! Anything that has to mutate console state afterwards is queued as a
//! [`ConsoleAction`] and applied once evaluation is done.

use super::{ConVarChangedEvent, ConsoleOutputEvent, ConsoleRegistry};

/// Nesting limit used when no [`ConsoleConfig`](crate::ConsoleConfig) is available.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Console state changes requested by a command while evaluating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Unregister a command.
    RemoveCommand(String),
    /// Clear frontends' output.
    Clear,
    /// Record the statement that set a variable so it is written to autoexec.
    Watch(String),
    /// Stop recording a variable.
    Unwatch(String),
}

/// Everything a statement produced besides its value.
#[derive(Debug, Default)]
pub struct ContextOutput {
    /// Printed lines, in order.
    pub outputs: Vec<ConsoleOutputEvent>,
    /// Variables written.
    pub changes: Vec<ConVarChangedEvent>,
    /// Deferred state changes.
    pub actions: Vec<ConsoleAction>,
}

/// Evaluation context passed to command handlers.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{Argument, Command, ConsoleRegistry};
///
/// let mut registry = ConsoleRegistry::new();
/// registry
///     .add_command(Command::new("Greet", |ctx, _args| {
///         ctx.print("hello");
///         Ok(Argument::none())
///     }))
///     .unwrap();
///
/// let mut ctx = registry.context();
/// ctx.execute("Greet");
/// assert_eq!(ctx.finish().outputs[0].message, "hello");
/// ```
pub struct CommandContext<'r> {
    pub(crate) registry: &'r ConsoleRegistry,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    output: ContextOutput,
}

impl<'r> CommandContext<'r> {
    /// Create a context evaluating against `registry`.
    pub fn new(registry: &'r ConsoleRegistry) -> Self {
        Self {
            registry,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            output: ContextOutput::default(),
        }
    }

    /// Set the nesting limit for parentheses and calls.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The registry being evaluated against.
    #[inline]
    pub fn registry(&self) -> &'r ConsoleRegistry {
        self.registry
    }

    /// Print an info line.
    pub fn print(&mut self, message: impl Into<String>) {
        self.output.outputs.push(ConsoleOutputEvent::info(message));
    }

    /// Print a warning line.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.output.outputs.push(ConsoleOutputEvent::warn(message));
    }

    /// Print an error line.
    pub fn error(&mut self, message: impl Into<String>) {
        self.output.outputs.push(ConsoleOutputEvent::error(message));
    }

    /// Push a preformatted output line.
    pub fn output(&mut self, event: ConsoleOutputEvent) {
        self.output.outputs.push(event);
    }

    /// Queue a state change for after the statement.
    pub fn defer(&mut self, action: ConsoleAction) {
        self.output.actions.push(action);
    }

    pub(crate) fn record_change(&mut self, name: &str, old_value: &str, new_value: &str) {
        self.output
            .changes
            .push(ConVarChangedEvent::new(name, old_value, new_value));
    }

    /// Lines printed so far.
    #[inline]
    pub fn outputs(&self) -> &[ConsoleOutputEvent] {
        &self.output.outputs
    }

    /// Consume the context, returning what was produced.
    pub fn finish(self) -> ContextOutput {
        self.output
    }
}
