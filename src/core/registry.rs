//! Console registry of named commands.
//!
//! Central storage with a [`Dictionary`] kept in sync for autocomplete.

use std::collections::HashMap;

use bevy::prelude::*;

use super::{
    parse_statement, Argument, AutocompleteType, Command, CommandContext, ConsoleError,
    ConsoleResult, Dictionary, StatementForm,
};

/// Check a command name: a letter first, then letters, digits or `_`.
///
/// ```
/// use bevy_console_lang::core::verify_command_name;
///
/// assert!(verify_command_name("sv_gravity"));
/// assert!(verify_command_name("Get2"));
/// assert!(!verify_command_name("2Get"));
/// assert!(!verify_command_name("get-value"));
/// assert!(!verify_command_name(""));
/// ```
pub fn verify_command_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Central registry for console commands and variables.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{Argument, Command, ConVar, ConsoleRegistry};
///
/// let mut registry = ConsoleRegistry::new();
///
/// let gravity = ConVar::new("sv_gravity", 800i32).description("World gravity");
/// let handle = gravity.handle();
/// registry.add_command(Command::variable(gravity)).unwrap();
/// registry
///     .add_command(Command::new("Five", |_ctx, _args| Ok(Argument::from(5i32))))
///     .unwrap();
///
/// registry.execute("sv_gravity(Five() * 100)");
/// assert_eq!(*handle.read().unwrap(), 500);
/// assert_eq!(registry.matches("sv"), vec!["sv_gravity"]);
/// ```
#[derive(Resource, Default)]
pub struct ConsoleRegistry {
    commands: HashMap<Box<str>, Command>,
    dictionary: Dictionary,
}

impl ConsoleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// Fails if the name is invalid or already taken; the registry is left
    /// unchanged in that case.
    pub fn add_command(&mut self, command: Command) -> ConsoleResult<()> {
        let name = command.name();
        if !verify_command_name(name) {
            bevy::log::warn!("Console: Rejected invalid command name '{}'", name);
            return Err(ConsoleError::InvalidCommandName(name.to_string()));
        }
        if self.commands.contains_key(name) {
            bevy::log::warn!("Console: Command '{}' is already registered", name);
            return Err(ConsoleError::DuplicateCommand(name.to_string()));
        }

        let name: Box<str> = name.into();
        bevy::log::debug!("Console: Registered command '{}'", name);
        self.dictionary.add_entry(&name);
        self.commands.insert(name, command);
        Ok(())
    }

    /// Unregister a command.
    ///
    /// Returns `false` if no command had this name.
    pub fn remove_command(&mut self, name: &str) -> bool {
        if self.commands.remove(name).is_none() {
            return false;
        }
        self.dictionary.remove_entry(name);
        bevy::log::debug!("Console: Removed command '{}'", name);
        true
    }

    /// Get a command by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Check if a command exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Get the number of commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(AsRef::as_ref).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over all commands in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Iterate over all variable commands.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.iter().filter(|(_, cmd)| cmd.is_variable())
    }

    /// Iterate over variable commands whose value differs from the default.
    pub fn modified_variables(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.variables()
            .filter(|(_, cmd)| cmd.targets().iter().any(|var| var.is_modified()))
    }

    /// The dictionary of registered names.
    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Command names matching a partially typed name.
    ///
    /// See [`Dictionary::matches`] for the matching rules.
    pub fn matches(&self, query: &str) -> Vec<String> {
        self.dictionary.matches(query)
    }

    /// Completions for a partially typed statement.
    ///
    /// Without arguments the command name is completed. Once arguments are
    /// being typed, the last argument is completed from the command's own
    /// words and, for [`AutocompleteType::All`], every command name.
    pub fn complete(&self, input: &str) -> Vec<String> {
        let stmt = parse_statement(input);
        if stmt.form == StatementForm::Bare {
            return self.matches(stmt.function);
        }

        let Some(command) = self.get(stmt.function) else {
            return Vec::new();
        };
        let partial_start = stmt
            .arguments
            .rfind(['(', ',', ' '])
            .map(|i| i + 1)
            .unwrap_or(0);
        let partial = &stmt.arguments[partial_start..];

        match command.get_autocomplete_type() {
            AutocompleteType::None => Vec::new(),
            AutocompleteType::OnlyCustom => command.autocomplete_dictionary().matches(partial),
            AutocompleteType::All => {
                let mut words = command.autocomplete_dictionary().matches(partial);
                words.extend(self.matches(partial));
                words.sort();
                words.dedup();
                words
            }
        }
    }

    /// A fresh evaluation context over this registry.
    pub fn context(&self) -> CommandContext<'_> {
        CommandContext::new(self)
    }

    /// Execute a statement, discarding any printed output.
    ///
    /// Failures come back as error arguments, see [`CommandContext::execute`].
    pub fn execute(&self, statement: &str) -> Argument {
        self.context().execute(statement)
    }

    /// Evaluate a standalone expression.
    pub fn evaluate(&self, expr: &str) -> ConsoleResult {
        self.context().evaluate_expression(expr)
    }

    /// Find commands whose name or help text contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query_lower = query.to_lowercase();

        let mut matches: Vec<&str> = self
            .commands
            .iter()
            .filter(|(name, cmd)| {
                name.to_lowercase().contains(&query_lower)
                    || cmd.get_help().to_lowercase().contains(&query_lower)
            })
            .map(|(name, _)| name.as_ref())
            .collect();

        matches.sort_unstable();
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConVar, ForceStringArguments};

    fn five() -> Command {
        Command::new("Five", |_ctx, _args| Ok(Argument::from(5i32)))
    }

    #[test]
    fn test_registry_add() {
        let mut registry = ConsoleRegistry::new();
        registry.add_command(five()).unwrap();

        assert!(registry.contains("Five"));
        assert_eq!(registry.len(), 1);
        assert!(registry.dictionary().contains("Five"));
        assert_eq!(registry.execute("Five").value(), "5");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ConsoleRegistry::new();
        registry.add_command(five()).unwrap();

        let err = registry
            .add_command(Command::new("Five", |_ctx, _args| Ok(Argument::from(6i32))))
            .unwrap_err();
        assert_eq!(err, ConsoleError::DuplicateCommand("Five".into()));
        assert_eq!(registry.execute("Five").value(), "5");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry = ConsoleRegistry::new();
        for name in ["", "1abc", "a b", "a-b", "_x", "a(b"] {
            let cmd = Command::new(name, |_ctx, _args| Ok(Argument::none()));
            assert_eq!(
                registry.add_command(cmd).unwrap_err(),
                ConsoleError::InvalidCommandName(name.into())
            );
        }
        assert!(registry.is_empty());
        assert!(registry.dictionary().is_empty());
    }

    #[test]
    fn test_remove_then_execute() {
        let mut registry = ConsoleRegistry::new();
        registry.add_command(five()).unwrap();

        assert!(registry.remove_command("Five"));
        assert!(!registry.remove_command("Five"));
        assert!(!registry.dictionary().contains("Five"));
        assert!(registry.matches("Fi").is_empty());

        let result = registry.execute("Five()");
        assert!(result.is_error());
        assert_eq!(result.origin(), crate::core::INVALID_ARGUMENT_ORIGIN);

        registry.add_command(five()).unwrap();
        assert_eq!(registry.execute("Five()").value(), "5");
    }

    #[test]
    fn test_matches_camel_case() {
        let mut registry = ConsoleRegistry::new();
        for name in ["GetSet", "GetValue", "SetValue"] {
            registry
                .add_command(Command::new(name, |_ctx, _args| Ok(Argument::none())))
                .unwrap();
        }

        assert_eq!(registry.matches("GS"), vec!["GetSet"]);
        assert_eq!(registry.matches("get"), vec!["GetSet", "GetValue"]);
        assert_eq!(registry.names(), vec!["GetSet", "GetValue", "SetValue"]);
    }

    #[test]
    fn test_complete_command_and_arguments() {
        let mut registry = ConsoleRegistry::new();
        registry.add_command(five()).unwrap();
        registry
            .add_command(
                Command::new("map", |_ctx, args| Ok(args.first().cloned().unwrap_or_default()))
                    .force_string_arguments(ForceStringArguments::All)
                    .autocomplete(AutocompleteType::OnlyCustom, ["de_dust", "de_nuke", "cs_office"]),
            )
            .unwrap();
        registry
            .add_command(
                Command::new("help", |_ctx, _args| Ok(Argument::none()))
                    .autocomplete(AutocompleteType::All, ["commands"]),
            )
            .unwrap();

        assert_eq!(registry.complete("ma"), vec!["map"]);
        assert_eq!(registry.complete("map de"), vec!["de_dust", "de_nuke"]);
        assert_eq!(registry.complete("help(F"), vec!["Five"]);
        assert_eq!(registry.complete("help co"), vec!["commands"]);
        assert!(registry.complete("Five(").is_empty());
        assert!(registry.complete("unknown x").is_empty());
    }

    #[test]
    fn test_modified_variables() {
        let mut registry = ConsoleRegistry::new();
        registry
            .add_command(Command::variable(ConVar::new("sv_gravity", 800.0f32)))
            .unwrap();
        registry
            .add_command(Command::variable(ConVar::new("sv_cheats", false)))
            .unwrap();
        registry.add_command(five()).unwrap();

        assert_eq!(registry.variables().count(), 2);
        assert_eq!(registry.modified_variables().count(), 0);

        registry.execute("sv_gravity 400");
        let modified: Vec<_> = registry.modified_variables().map(|(name, _)| name).collect();
        assert_eq!(modified, vec!["sv_gravity"]);
    }

    #[test]
    fn test_search() {
        let mut registry = ConsoleRegistry::new();
        registry
            .add_command(Command::variable(
                ConVar::new("sv_gravity", 800.0f32).description("World gravity force"),
            ))
            .unwrap();
        registry
            .add_command(Command::variable(
                ConVar::new("sv_cheats", false).description("Enable cheats"),
            ))
            .unwrap();

        assert_eq!(registry.search("gravity"), vec!["sv_gravity"]);
        assert_eq!(registry.search("FORCE"), vec!["sv_gravity"]);
        assert_eq!(registry.search("sv_"), vec!["sv_cheats", "sv_gravity"]);
    }

    #[test]
    fn test_evaluate() {
        let registry = ConsoleRegistry::new();
        assert_eq!(registry.evaluate("(1+2)*3").unwrap().value(), "9");
        assert_eq!(registry.evaluate("1+2*3").unwrap().value(), "7");
    }
}
