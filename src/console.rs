//! Unified console API for systems.
//!
//! The [`Console`] system parameter combines the [`ConsoleRegistry`] with the
//! plugin's statement queue, so systems can register commands and submit
//! input without writing messages themselves.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::core::{Argument, Command, ConsoleRegistry, ConsoleResult, split_commands};
use crate::{ConsoleConfig, PendingStatements};

#[cfg(feature = "autoexec")]
type Autoexec<'w> = Option<ResMut<'w, crate::AutoexecManager>>;
#[cfg(not(feature = "autoexec"))]
type Autoexec<'w> = std::marker::PhantomData<&'w ()>;

/// Console system parameter.
///
/// # Examples
///
/// ```ignore
/// fn setup_console(mut console: Console) {
///     console
///         .add_command(Command::new("Five", |_ctx, _args| Ok(Argument::from(5i32))))
///         .unwrap();
///
///     // Runs on the next Update, with echo and result printing.
///     console.queue("print(1 + Five())");
/// }
/// ```
#[derive(SystemParam)]
pub struct Console<'w> {
    registry: ResMut<'w, ConsoleRegistry>,
    pending: ResMut<'w, PendingStatements>,
    config: Res<'w, ConsoleConfig>,
    #[cfg_attr(not(feature = "autoexec"), allow(dead_code))]
    autoexec: Autoexec<'w>,
}

impl Console<'_> {
    /// Register a command.
    pub fn add_command(&mut self, command: Command) -> ConsoleResult<()> {
        self.registry.add_command(command)
    }

    /// Unregister a command. Returns `false` if it did not exist.
    pub fn remove_command(&mut self, name: &str) -> bool {
        self.registry.remove_command(name)
    }

    /// Queue input for the console pipeline. `;` separates statements.
    pub fn queue(&mut self, input: &str) {
        for statement in split_commands(input) {
            self.pending.queue.push(statement.to_string());
        }
    }

    /// Execute a statement right away, outside the pipeline.
    ///
    /// Uses the configured nesting limit. Printed lines are sent as output
    /// messages and deferred actions are applied on the next update. A
    /// watched command called with arguments is recorded in the autoexec file.
    pub fn execute(&mut self, statement: &str) -> Argument {
        let mut ctx = self
            .registry
            .context()
            .with_max_depth(self.config.max_expression_depth);
        let value = ctx.execute(statement);
        let output = ctx.finish();
        self.pending.outputs.extend(output.outputs);
        self.pending.changes.extend(output.changes);
        self.pending.actions.extend(output.actions);

        #[cfg(feature = "autoexec")]
        if !value.is_error() {
            self.observe(statement);
        }
        value
    }

    #[cfg(feature = "autoexec")]
    fn observe(&mut self, statement: &str) {
        let Some(autoexec) = self.autoexec.as_mut() else {
            return;
        };
        if autoexec.observe(statement) {
            if let Err(err) = autoexec.save() {
                error!("Console: {}", err);
            }
        }
    }

    /// Check if a command exists.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Current value of a variable command.
    pub fn get_value(&self, name: &str) -> Option<Argument> {
        self.registry.get(name).and_then(Command::get_value)
    }

    /// Completions for a partially typed statement.
    pub fn complete(&self, input: &str) -> Vec<String> {
        self.registry.complete(input)
    }

    /// Get read-only access to the underlying registry.
    pub fn registry(&self) -> &ConsoleRegistry {
        &self.registry
    }
}
