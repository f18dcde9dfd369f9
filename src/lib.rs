//! A small command language and developer console for Bevy.
//!
//! bevy_console_lang provides:
//!
//! - **Argument**: Dynamically typed values with operator-precedence arithmetic
//! - **Command**: Native commands and bound variables (`ConVar`)
//! - **ConsoleRegistry**: Named commands with camel-case autocomplete
//! - **Console**: Unified system parameter for convenient access
//! - **AutoexecManager**: A startup script that remembers watched settings
//!
//! Statements take three forms: `Name`, `Name(a, b)` and `Name a, b`.
//! Arguments are expressions: numbers, `TRUE`/`FALSE`, string literals,
//! nested calls and `+ - * /` with the usual precedence.
//!
//! # Features
//!
//! - `autoexec` (default): autoexec file with `watch`/`unwatch`
//! - `terminal`: stdin/stdout backend for dedicated servers
//! - `log_capture`: mirror engine log records into the console output
//! - `full`: Enable everything
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_console_lang::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConsolePlugin)
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: Console) {
//!     // Register a variable
//!     console
//!         .add_command(Command::variable(
//!             ConVar::new("sv_gravity", 800.0f32).description("World gravity"),
//!         ))
//!         .unwrap();
//!
//!     // Register a command
//!     console
//!         .add_command(Command::new("Half", |_ctx, args| {
//!             let value = args.first().map(Argument::as_f64).transpose()?.unwrap_or(0.0);
//!             Ok(Argument::from(value / 2.0))
//!         }))
//!         .unwrap();
//!
//!     console.queue("sv_gravity(Half(1200) + 200)");
//! }
//! ```

use bevy::prelude::*;

pub mod config;
pub mod core;
mod console;

#[cfg(feature = "autoexec")]
pub mod autoexec;

#[cfg(feature = "log_capture")]
pub mod logging;

#[cfg(feature = "terminal")]
pub mod terminal;

// Re-export core types at crate root for convenience
pub use core::{
    Argument, ArgumentType, Operator,
    AutocompleteType, Command, CommandHandler, CommandKind, ForceStringArguments,
    CommandContext, ConsoleAction, ContextOutput,
    ConVar, ConVarDyn, ConVarHandle, ConVarValue,
    Dictionary,
    ConsoleError, ConsoleResult,
    ConsoleRegistry, verify_command_name,
    split_commands,
    ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel,
    ConVarChangedEvent, ConsoleClearEvent,
    ConsoleEventsPlugin,
};

pub use config::ConsoleConfig;
pub use console::Console;

#[cfg(feature = "autoexec")]
pub use autoexec::{AutoexecLine, AutoexecManager};

#[cfg(feature = "log_capture")]
pub use logging::custom_log_layer;

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Argument, ArgumentType,
        AutocompleteType, Command, ForceStringArguments,
        CommandContext, ConsoleAction,
        ConVar, ConVarValue,
        ConsoleError, ConsoleResult,
        ConsoleRegistry,
        ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel, ConVarChangedEvent,
        split_commands,
    };
    pub use crate::{Console, ConsoleConfig, ConsolePlugin};
}

/// Main console plugin.
///
/// # Configuration
///
/// ```ignore
/// App::new()
///     .insert_resource(ConsoleConfig::default().echo_commands(false))
///     .add_plugins(ConsolePlugin);
/// ```
#[derive(Default)]
pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConsoleRegistry>()
            .init_resource::<ConsoleConfig>()
            .init_resource::<PendingStatements>()
            .add_plugins(core::ConsoleEventsPlugin);

        app.add_systems(Startup, register_builtin_commands);

        // Process console input in three stages:
        // 1. parse_console_input: Read input messages, split statements, queue them
        // 2. execute_pending_statements: Evaluate with exclusive World access
        // 3. send_pending_outputs: Send output, change and clear messages
        app.add_systems(Update, (
            parse_console_input,
            execute_pending_statements,
            send_pending_outputs,
        ).chain());

        // Runs after every Startup system so user commands exist.
        #[cfg(feature = "autoexec")]
        app.add_systems(PostStartup, load_autoexec);

        #[cfg(feature = "terminal")]
        {
            app.add_plugins(terminal::TerminalPlugin);
        }
    }
}

/// Register a command, logging instead of failing on conflicts.
fn register(registry: &mut ConsoleRegistry, command: Command) {
    if let Err(err) = registry.add_command(command) {
        warn!("Console: Built-in command not registered: {}", err);
    }
}

/// The variable command named by the only argument.
fn variable_command<'r>(ctx: &CommandContext<'r>, args: &[Argument]) -> ConsoleResult<&'r Command> {
    let [name] = args else {
        return Err(ConsoleError::InvalidArgument(format!(
            "expected one variable name, got {} arguments",
            args.len()
        )));
    };
    let command = ctx
        .registry()
        .get(name.value())
        .ok_or_else(|| ConsoleError::UnknownCommand(name.value().to_string()))?;
    if !command.is_variable() {
        return Err(ConsoleError::InvalidArgument(format!(
            "'{}' is not a variable",
            command.name()
        )));
    }
    Ok(command)
}

/// Register built-in console commands.
fn register_builtin_commands(mut registry: ResMut<ConsoleRegistry>) {
    // help - List commands or describe one
    register(&mut registry, Command::new("help", |ctx, args| {
        let registry = ctx.registry();

        let Some(name) = args.first() else {
            ctx.print("Commands:");
            for name in registry.names() {
                ctx.print(format!("  {}", name));
            }
            ctx.print("Use 'help <name>' for details");
            return Ok(Argument::none());
        };

        let command = registry
            .get(name.value())
            .ok_or_else(|| ConsoleError::UnknownCommand(name.value().to_string()))?;
        let help = command.get_help();
        ctx.print(format!(
            "{} - {}",
            command.name(),
            if help.is_empty() { "No description" } else { help }
        ));
        if !command.get_usage().is_empty() {
            ctx.print(format!("  Usage: {}", command.get_usage()));
        }
        if !command.get_example().is_empty() {
            ctx.print(format!("  Example: {}", command.get_example()));
        }
        if let Some(var) = command.targets().first() {
            ctx.print(format!("  Current: {}", var.get_argument()));
            ctx.print(format!("  Default: {}", var.default_argument()));
        }
        Ok(Argument::none())
    })
    .help("List commands or describe one")
    .usage("help [name]")
    .example("help sv_gravity")
    .force_string_arguments(ForceStringArguments::PerArgument)
    .autocomplete_type(AutocompleteType::All));

    // find - Match command names, camel-case aware
    register(&mut registry, Command::new("find", |ctx, args| {
        let Some(query) = args.first() else {
            return Err(ConsoleError::InvalidArgument("usage: find <name>".into()));
        };
        let registry = ctx.registry();
        let matches = registry.matches(query.value());
        for name in &matches {
            match registry.get(name).map(Command::get_help) {
                Some(help) if !help.is_empty() => ctx.print(format!("{} - {}", name, help)),
                _ => ctx.print(name.clone()),
            }
        }
        ctx.print(format!("{} results", matches.len()));
        Ok(Argument::none())
    })
    .help("Find commands by name, e.g. 'GS' finds GetSet")
    .usage("find <name>")
    .force_string_arguments(ForceStringArguments::All));

    // echo - Print text as written
    register(&mut registry, Command::new("echo", |ctx, args| {
        let text = args.first().map(Argument::value).unwrap_or_default();
        ctx.print(text);
        Ok(Argument::none())
    })
    .help("Print text to the console")
    .usage("echo <text>")
    .force_string_arguments(ForceStringArguments::All));

    // print - Evaluate and print each argument
    register(&mut registry, Command::new("print", |ctx, args| {
        let values: Vec<&str> = args.iter().map(Argument::value).collect();
        ctx.print(values.join(" "));
        Ok(Argument::none())
    })
    .help("Evaluate expressions and print the results")
    .usage("print(expr, ...)")
    .example("print(1 + 2 * 3, \"done\")"));

    // clear - Clear console output
    register(&mut registry, Command::new("clear", |ctx, _args| {
        ctx.defer(ConsoleAction::Clear);
        Ok(Argument::none())
    })
    .help("Clear console output"));

    // toggle - Flip a boolean or numeric variable
    register(&mut registry, Command::new("toggle", |ctx, args| {
        let command = variable_command(ctx, args)?;
        let current = command.get_value().unwrap_or_default().as_bool()?;
        command.execute(ctx, &[Argument::from(!current)])
    })
    .help("Toggle a boolean variable")
    .usage("toggle <variable>")
    .force_string_arguments(ForceStringArguments::PerArgument)
    .autocomplete_type(AutocompleteType::All));

    // reset - Restore a variable's default
    register(&mut registry, Command::new("reset", |ctx, args| {
        let command = variable_command(ctx, args)?;
        let old = command.get_value().unwrap_or_default();
        for var in command.targets() {
            var.reset();
        }
        let new = command.get_value().unwrap_or_default();
        if old.value() != new.value() {
            ctx.record_change(command.name(), old.value(), new.value());
        }
        Ok(new)
    })
    .help("Reset a variable to its default value")
    .usage("reset <variable>")
    .force_string_arguments(ForceStringArguments::PerArgument)
    .autocomplete_type(AutocompleteType::All));

    // differences - Variables that differ from their default
    register(&mut registry, Command::new("differences", |ctx, _args| {
        let mut modified: Vec<_> = ctx.registry().modified_variables().collect();
        modified.sort_unstable_by_key(|(name, _)| *name);

        for (name, command) in &modified {
            if let Some(var) = command.targets().first() {
                ctx.print(format!(
                    "{} = {} (default: {})",
                    name,
                    var.get_argument(),
                    var.default_argument()
                ));
            }
        }

        if modified.is_empty() {
            ctx.print("No modified variables");
        } else {
            ctx.print(format!("{} modified variables", modified.len()));
        }
        Ok(Argument::none())
    })
    .help("Show variables with non-default values"));

    #[cfg(feature = "autoexec")]
    register_autoexec_commands(&mut registry);
}

/// Register autoexec-related commands.
#[cfg(feature = "autoexec")]
fn register_autoexec_commands(registry: &mut ConsoleRegistry) {
    // watch - Run a statement and keep it in the autoexec file
    register(registry, Command::new("watch", |ctx, args| {
        let Some(statement) = args.first() else {
            return Err(ConsoleError::InvalidArgument("usage: watch <statement>".into()));
        };
        let value = ctx.execute_argument_function(statement.value())?;
        ctx.defer(ConsoleAction::Watch(statement.value().to_string()));
        Ok(value)
    })
    .help("Run a statement and keep its latest value in the autoexec file")
    .usage("watch <statement>")
    .example("watch sv_gravity 600")
    .force_string_arguments(ForceStringArguments::All)
    .autocomplete_type(AutocompleteType::All));

    // unwatch - Drop a watched command from the autoexec file
    register(registry, Command::new("unwatch", |ctx, args| {
        if args.is_empty() {
            return Err(ConsoleError::InvalidArgument("usage: unwatch <name>".into()));
        }
        for name in args {
            ctx.defer(ConsoleAction::Unwatch(name.value().to_string()));
        }
        Ok(Argument::none())
    })
    .help("Stop keeping a command in the autoexec file")
    .usage("unwatch <name>")
    .force_string_arguments(ForceStringArguments::PerArgument)
    .autocomplete_type(AutocompleteType::All));
}

/// Resource that holds statements and results between pipeline stages.
///
/// Filled by [`Console`] and the input stage, drained by the output stage.
#[derive(Resource, Default)]
pub struct PendingStatements {
    pub(crate) queue: Vec<String>,
    pub(crate) outputs: Vec<ConsoleOutputEvent>,
    pub(crate) changes: Vec<ConVarChangedEvent>,
    pub(crate) actions: Vec<ConsoleAction>,
    pub(crate) clear_console: bool,
}

/// System that splits console input into statements and queues them.
fn parse_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    mut pending: ResMut<PendingStatements>,
) {
    for event in input_events.read() {
        for statement in split_commands(&event.command) {
            pending.queue.push(statement.to_string());
        }
    }
}

/// Exclusive system that evaluates queued statements.
fn execute_pending_statements(world: &mut World) {
    let mut pending = world.resource_mut::<PendingStatements>();
    if pending.queue.is_empty() && pending.actions.is_empty() {
        return;
    }
    let queue = std::mem::take(&mut pending.queue);
    let actions = std::mem::take(&mut pending.actions);
    let mut outputs = std::mem::take(&mut pending.outputs);
    let mut changes = std::mem::take(&mut pending.changes);
    drop(pending);

    let config = world.resource::<ConsoleConfig>().clone();

    // Actions queued outside the pipeline, e.g. by `Console::execute`
    apply_actions(world, actions, &mut outputs);

    for statement in queue {
        if config.echo_commands {
            outputs.push(ConsoleOutputEvent::command(format!("$ {}", statement)));
        }

        let (result, output) = {
            let registry = world.resource::<ConsoleRegistry>();
            let mut ctx = registry
                .context()
                .with_max_depth(config.max_expression_depth);
            let result = ctx.try_execute(&statement);
            (result, ctx.finish())
        };
        outputs.extend(output.outputs);
        changes.extend(output.changes);

        match result {
            Ok(value) => {
                if config.print_results && !value.is_none() {
                    outputs.push(ConsoleOutputEvent::result(format!("> {}", value)));
                }
                #[cfg(feature = "autoexec")]
                if let Some(mut autoexec) = world.get_resource_mut::<AutoexecManager>() {
                    autoexec.observe(&statement);
                }
            }
            Err(err) => {
                debug!("Console: '{}' failed: {}", statement, err);
                outputs.push(ConsoleOutputEvent::error(err.to_string()));
            }
        }

        apply_actions(world, output.actions, &mut outputs);
    }

    #[cfg(feature = "autoexec")]
    if let Some(mut autoexec) = world.get_resource_mut::<AutoexecManager>() {
        if autoexec.is_dirty() {
            if let Err(err) = autoexec.save() {
                error!("Console: {}", err);
                outputs.push(ConsoleOutputEvent::error(err.to_string()));
            }
        }
    }

    // Store outputs and changes back for the next system to send
    let mut pending = world.resource_mut::<PendingStatements>();
    pending.outputs = outputs;
    pending.changes = changes;
}

/// Apply state changes requested by commands.
fn apply_actions(world: &mut World, actions: Vec<ConsoleAction>, outputs: &mut Vec<ConsoleOutputEvent>) {
    for action in actions {
        match action {
            ConsoleAction::RemoveCommand(name) => {
                if !world.resource_mut::<ConsoleRegistry>().remove_command(&name) {
                    outputs.push(ConsoleOutputEvent::warn(format!("Unknown command: '{}'", name)));
                }
            }
            ConsoleAction::Clear => {
                world.resource_mut::<PendingStatements>().clear_console = true;
            }
            #[cfg(feature = "autoexec")]
            ConsoleAction::Watch(statement) => match world.get_resource_mut::<AutoexecManager>() {
                Some(mut autoexec) => autoexec.watch(&statement),
                None => outputs.push(ConsoleOutputEvent::warn("Autoexec is not loaded")),
            },
            #[cfg(feature = "autoexec")]
            ConsoleAction::Unwatch(name) => match world.get_resource_mut::<AutoexecManager>() {
                Some(mut autoexec) => {
                    if !autoexec.unwatch(&name) {
                        outputs.push(ConsoleOutputEvent::warn(format!("'{}' is not watched", name)));
                    }
                }
                None => outputs.push(ConsoleOutputEvent::warn("Autoexec is not loaded")),
            },
            #[cfg(not(feature = "autoexec"))]
            ConsoleAction::Watch(_) | ConsoleAction::Unwatch(_) => {
                outputs.push(ConsoleOutputEvent::warn("Autoexec support is disabled"));
            }
        }
    }
}

/// System that sends queued output messages.
fn send_pending_outputs(
    mut pending: ResMut<PendingStatements>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
    mut change_events: MessageWriter<ConVarChangedEvent>,
    mut clear_events: MessageWriter<ConsoleClearEvent>,
) {
    for output in pending.outputs.drain(..) {
        output_events.write(output);
    }
    for change in pending.changes.drain(..) {
        change_events.write(change);
    }
    if pending.clear_console {
        pending.clear_console = false;
        clear_events.write(ConsoleClearEvent);
    }
}

/// Load the autoexec file and run it once.
#[cfg(feature = "autoexec")]
fn load_autoexec(
    mut commands: Commands,
    config: Res<ConsoleConfig>,
    registry: Res<ConsoleRegistry>,
    mut pending: ResMut<PendingStatements>,
) {
    let autoexec = match AutoexecManager::load(&config.autoexec_path) {
        Ok(autoexec) => autoexec,
        Err(err) => {
            error!("Console: {}", err);
            AutoexecManager::new(&config.autoexec_path)
        }
    };

    if config.run_autoexec_on_startup && !autoexec.lines().is_empty() {
        info!("Console: Executing '{}'...", config.autoexec_path);
        let mut ctx = registry
            .context()
            .with_max_depth(config.max_expression_depth);
        let result = autoexec.run(&mut ctx);
        let output = ctx.finish();

        pending.outputs.extend(output.outputs);
        pending.changes.extend(output.changes);
        pending.actions.extend(output.actions);
        match result {
            Ok(count) => info!("Console: Executed {} statements from '{}'", count, config.autoexec_path),
            Err(err) => {
                error!("Console: '{}': {}", config.autoexec_path, err);
                pending.outputs.push(ConsoleOutputEvent::error(err.to_string()));
            }
        }
    }

    commands.insert_resource(autoexec);
}
