//! Console plugin configuration.

use bevy::prelude::*;

use crate::core::DEFAULT_MAX_DEPTH;

/// Default autoexec file name.
pub const DEFAULT_AUTOEXEC_FILE: &str = "autoexec.cfg";

/// Behavior of the console pipeline.
///
/// Insert this resource before adding [`ConsolePlugin`](crate::ConsolePlugin)
/// to override the defaults.
///
/// # Examples
///
/// ```ignore
/// App::new()
///     .insert_resource(
///         ConsoleConfig::default()
///             .max_expression_depth(16)
///             .autoexec_path("cfg/server.cfg"),
///     )
///     .add_plugins(ConsolePlugin);
/// ```
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Nesting limit for parentheses and calls in one statement.
    pub max_expression_depth: usize,
    /// Echo each statement as a command line before running it.
    pub echo_commands: bool,
    /// Print the value of statements that return one.
    pub print_results: bool,
    /// File read on startup and rewritten when watches change.
    pub autoexec_path: String,
    /// Run the autoexec file once the built-in commands are registered.
    pub run_autoexec_on_startup: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_expression_depth: DEFAULT_MAX_DEPTH,
            echo_commands: true,
            print_results: true,
            autoexec_path: DEFAULT_AUTOEXEC_FILE.to_string(),
            run_autoexec_on_startup: true,
        }
    }
}

impl ConsoleConfig {
    /// Set the nesting limit.
    pub fn max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }

    /// Set whether statements are echoed.
    pub fn echo_commands(mut self, echo: bool) -> Self {
        self.echo_commands = echo;
        self
    }

    /// Set whether results are printed.
    pub fn print_results(mut self, print: bool) -> Self {
        self.print_results = print;
        self
    }

    /// Set the autoexec file path.
    pub fn autoexec_path(mut self, path: impl Into<String>) -> Self {
        self.autoexec_path = path.into();
        self
    }

    /// Set whether the autoexec file runs on startup.
    pub fn run_autoexec_on_startup(mut self, run: bool) -> Self {
        self.run_autoexec_on_startup = run;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.max_expression_depth, 64);
        assert!(config.echo_commands);
        assert!(config.print_results);
        assert_eq!(config.autoexec_path, "autoexec.cfg");
        assert!(config.run_autoexec_on_startup);
    }

    #[test]
    fn test_builder() {
        let config = ConsoleConfig::default()
            .max_expression_depth(8)
            .echo_commands(false)
            .autoexec_path("server.cfg")
            .run_autoexec_on_startup(false);

        assert_eq!(config.max_expression_depth, 8);
        assert!(!config.echo_commands);
        assert_eq!(config.autoexec_path, "server.cfg");
        assert!(!config.run_autoexec_on_startup);
    }
}
