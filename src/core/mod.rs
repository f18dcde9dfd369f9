//! Core console language, independent of any frontend.
//!
//! This module provides the fundamental building blocks:
//! - [`Argument`] - Dynamically typed values and their arithmetic
//! - [`Dictionary`] - Trie with camel-case matching for autocomplete
//! - [`Command`] - Native commands and bound variables
//! - [`ConsoleRegistry`] - Central registry of named commands
//! - [`CommandContext`] - Statement and expression evaluation
//! - Tokenizer functions for statements, arguments and expressions
//! - Messages for communication with the rest of the app

mod argument;
mod command;
mod context;
mod convar;
mod dictionary;
mod error;
mod evaluator;
mod events;
mod registry;
mod tokenizer;

pub use argument::{Argument, ArgumentType, Operator, INVALID_ARGUMENT_ORIGIN, RUNTIME_ERROR_ORIGIN};
pub use command::{AutocompleteType, Command, CommandHandler, CommandKind, ForceStringArguments};
pub use context::{CommandContext, ConsoleAction, ContextOutput, DEFAULT_MAX_DEPTH};
pub use convar::{ConVar, ConVarDyn, ConVarHandle, ConVarValue};
pub use dictionary::{is_delimiter, Dictionary};
pub use error::{ConsoleError, ConsoleResult};
pub use events::{
    ConVarChangedEvent, ConsoleClearEvent, ConsoleEventsPlugin, ConsoleInputEvent,
    ConsoleOutputEvent, ConsoleOutputLevel,
};
pub use registry::{verify_command_name, ConsoleRegistry};
pub use tokenizer::{
    parse_statement, split_arguments, split_commands, split_escaped_commas, split_expression,
    starts_with_call, trim_text, ParsedStatement, StatementForm, EXPRESSION_DELIMITERS,
};
