//! Error types for console parsing and evaluation.

use thiserror::Error;

use super::ArgumentType;

/// Result type for console operations. Defaults to an [`Argument`](super::Argument) payload.
pub type ConsoleResult<T = super::Argument> = Result<T, ConsoleError>;

/// Errors raised while parsing, evaluating or executing console input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    /// Generic invalid user input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No command with this name is registered.
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    /// The name does not follow the command naming rule.
    #[error("invalid command name: '{0}'")]
    InvalidCommandName(String),

    /// A command with this name is already registered.
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    /// A string literal is missing its closing quote.
    #[error("unterminated string literal: {0}")]
    UnterminatedString(String),

    /// A string literal contains an unescaped quote.
    #[error("unexpected quote in string literal: {0}")]
    UnexpectedQuote(String),

    /// A numeric literal could not be parsed.
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),

    /// Parentheses in an expression do not balance.
    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParentheses(String),

    /// The operator is not defined for the resolved type.
    #[error("operator '{op}' is not supported for type {ty}")]
    UnsupportedOperation { op: char, ty: ArgumentType },

    /// Integer division by zero.
    #[error("division by zero in '{0}'")]
    DivisionByZero(String),

    /// Integer arithmetic overflowed its resolved width.
    #[error("arithmetic overflow in '{0}'")]
    Overflow(String),

    /// Nesting of parentheses or calls exceeded the configured limit.
    #[error("expression nesting exceeds the limit of {limit}")]
    ExpressionTooDeep { limit: usize },

    /// A command received more arguments than it accepts.
    #[error("too many arguments: expected at most {expected}, got {got}")]
    TooManyArguments { expected: usize, got: usize },

    /// A command handler failed.
    #[error("{0}")]
    Execution(String),

    /// An autoexec line failed to execute.
    #[error("autoexec line {line}: {message}")]
    Autoexec { line: usize, message: String },

    /// File I/O failed (path, message).
    #[error("I/O error for '{0}': {1}")]
    Io(String, String),
}

impl ConsoleError {
    /// Whether this error belongs to the user-input class.
    ///
    /// These are the errors an interactive user can cause by mistyping, as
    /// opposed to runtime failures of arithmetic or commands.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            ConsoleError::InvalidArgument(_)
                | ConsoleError::UnknownCommand(_)
                | ConsoleError::InvalidCommandName(_)
                | ConsoleError::UnterminatedString(_)
                | ConsoleError::UnexpectedQuote(_)
                | ConsoleError::InvalidNumber(_)
                | ConsoleError::UnbalancedParentheses(_)
                | ConsoleError::TooManyArguments { .. }
        )
    }

    /// Shorthand for [`ConsoleError::Execution`].
    pub fn execution(message: impl Into<String>) -> Self {
        ConsoleError::Execution(message.into())
    }
}
