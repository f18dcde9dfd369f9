//! Console commands: native handlers and bound variables.
//!
//! Every registered name maps to a [`Command`]. A command is either a native
//! handler, a single bound variable or a group of variables written together.

use std::fmt;

use super::{
    Argument, ConVar, ConVarDyn, ConVarValue, CommandContext, ConsoleError, ConsoleResult,
    Dictionary,
};

/// How the argument text of a call is turned into arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForceStringArguments {
    /// Arguments are evaluated as expressions.
    #[default]
    None,
    /// The whole argument text is passed as one string.
    All,
    /// The text is split on unescaped commas and each piece passed as a string.
    PerArgument,
}

/// Where argument completions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutocompleteType {
    /// No argument completion.
    #[default]
    None,
    /// The command's own words plus every registered command name.
    All,
    /// Only the command's own words.
    OnlyCustom,
}

/// Type alias for native command handlers.
///
/// Handlers receive:
/// - `ctx`: The evaluation context (output, registry access, deferred actions)
/// - `args`: The evaluated arguments
pub type CommandHandler =
    Box<dyn Fn(&mut CommandContext<'_>, &[Argument]) -> ConsoleResult + Send + Sync>;

/// What a command does when called.
pub enum CommandKind {
    /// Calls a handler.
    Native(CommandHandler),
    /// Reads or writes one variable.
    Variable(Box<dyn ConVarDyn>),
    /// Reads the first variable or writes all of them.
    MultiVariable(Vec<Box<dyn ConVarDyn>>),
}

/// A registered console command.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{Argument, Command, ConsoleRegistry};
///
/// let mut registry = ConsoleRegistry::new();
/// registry
///     .add_command(
///         Command::new("Max", |_ctx, args| {
///             let a = args.first().map(Argument::as_f64).transpose()?.unwrap_or(0.0);
///             let b = args.get(1).map(Argument::as_f64).transpose()?.unwrap_or(0.0);
///             Ok(Argument::from(a.max(b)))
///         })
///         .help("Larger of two numbers")
///         .usage("Max(a, b)"),
///     )
///     .unwrap();
///
/// assert_eq!(registry.execute("Max(2, 1+4)").value(), "5");
/// ```
pub struct Command {
    name: Box<str>,
    help: &'static str,
    usage: &'static str,
    example: &'static str,
    force_string_arguments: ForceStringArguments,
    autocomplete_type: AutocompleteType,
    autocomplete: Dictionary,
    kind: CommandKind,
}

impl Command {
    fn with_kind(name: Box<str>, kind: CommandKind) -> Self {
        Self {
            name,
            help: "",
            usage: "",
            example: "",
            force_string_arguments: ForceStringArguments::None,
            autocomplete_type: AutocompleteType::None,
            autocomplete: Dictionary::new(),
            kind,
        }
    }

    /// Create a native command with the given name and handler.
    pub fn new<F>(name: impl Into<Box<str>>, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, &[Argument]) -> ConsoleResult + Send + Sync + 'static,
    {
        Self::with_kind(name.into(), CommandKind::Native(Box::new(handler)))
    }

    /// Create a command that reads and writes a variable.
    ///
    /// Called without arguments it returns the value, with one argument it
    /// stores it.
    pub fn variable<T: ConVarValue>(convar: ConVar<T>) -> Self {
        let name: Box<str> = convar.name().into();
        let help = convar.get_description();
        let mut command = Self::with_kind(name, CommandKind::Variable(Box::new(convar)));
        command.help = help;
        command
    }

    /// Create a command writing several variables at once.
    ///
    /// Reading returns the first variable's value.
    pub fn multi_variable<T: ConVarValue>(name: impl Into<Box<str>>, convars: Vec<ConVar<T>>) -> Self {
        let targets = convars
            .into_iter()
            .map(|c| Box::new(c) as Box<dyn ConVarDyn>)
            .collect();
        Self::with_kind(name.into(), CommandKind::MultiVariable(targets))
    }

    /// Set the help text.
    pub fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    /// Set the usage text.
    pub fn usage(mut self, usage: &'static str) -> Self {
        self.usage = usage;
        self
    }

    /// Set the example text.
    pub fn example(mut self, example: &'static str) -> Self {
        self.example = example;
        self
    }

    /// Set how arguments are passed to the handler.
    pub fn force_string_arguments(mut self, mode: ForceStringArguments) -> Self {
        self.force_string_arguments = mode;
        self
    }

    /// Set the argument completion source.
    pub fn autocomplete_type(mut self, ty: AutocompleteType) -> Self {
        self.autocomplete_type = ty;
        self
    }

    /// Set the argument completion source and the command's own words.
    pub fn autocomplete<I, S>(mut self, ty: AutocompleteType, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.autocomplete_type = ty;
        self.autocomplete = Dictionary::from_words(words);
        self
    }

    /// Get the command name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the help text.
    #[inline]
    pub fn get_help(&self) -> &'static str {
        self.help
    }

    /// Get the usage text.
    #[inline]
    pub fn get_usage(&self) -> &'static str {
        self.usage
    }

    /// Get the example text.
    #[inline]
    pub fn get_example(&self) -> &'static str {
        self.example
    }

    /// Get the argument passing mode.
    #[inline]
    pub fn get_force_string_arguments(&self) -> ForceStringArguments {
        self.force_string_arguments
    }

    /// Get the argument completion source.
    #[inline]
    pub fn get_autocomplete_type(&self) -> AutocompleteType {
        self.autocomplete_type
    }

    /// The command's own completion words.
    #[inline]
    pub fn autocomplete_dictionary(&self) -> &Dictionary {
        &self.autocomplete
    }

    /// Get the command kind.
    #[inline]
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Whether this command wraps one or more variables.
    #[inline]
    pub fn is_variable(&self) -> bool {
        !matches!(self.kind, CommandKind::Native(_))
    }

    /// The variables this command reads and writes.
    pub fn targets(&self) -> &[Box<dyn ConVarDyn>] {
        match &self.kind {
            CommandKind::Native(_) => &[],
            CommandKind::Variable(var) => std::slice::from_ref(var),
            CommandKind::MultiVariable(vars) => vars,
        }
    }

    /// Current value of a variable command, `None` for native commands.
    pub fn get_value(&self) -> Option<Argument> {
        self.targets().first().map(|var| var.get_argument())
    }

    /// Execute the command with evaluated arguments.
    pub fn execute(&self, ctx: &mut CommandContext<'_>, args: &[Argument]) -> ConsoleResult {
        match &self.kind {
            CommandKind::Native(handler) => handler(ctx, args),
            CommandKind::Variable(_) | CommandKind::MultiVariable(_) => self.execute_variable(ctx, args),
        }
    }

    fn execute_variable(&self, ctx: &mut CommandContext<'_>, args: &[Argument]) -> ConsoleResult {
        let targets = self.targets();
        match args {
            [] => Ok(self.get_value().unwrap_or_default()),
            [value] => {
                let old = self.get_value().unwrap_or_default();
                // Targets are written in order; a failure stops the write but
                // the targets already written still count as a change.
                let written = targets
                    .iter()
                    .try_for_each(|var| var.set_argument(value).map(drop));
                let new = self.get_value().unwrap_or_default();
                if old.value() != new.value() {
                    ctx.record_change(&self.name, old.value(), new.value());
                }
                written?;
                Ok(new.with_origin(self.name.as_ref()))
            }
            _ => Err(ConsoleError::TooManyArguments {
                expected: 1,
                got: args.len(),
            }),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("force_string_arguments", &self.force_string_arguments)
            .field("autocomplete_type", &self.autocomplete_type)
            .finish_non_exhaustive()
    }
}
