//! Splitting of console input into statements, arguments and expression tokens.
//!
//! Everything here is quote aware: text between unescaped double quotes is
//! never split, trimmed or treated as an operator. Inside a string a backslash
//! escapes the next character.

use std::collections::VecDeque;

/// Characters that separate expression tokens.
pub const EXPRESSION_DELIMITERS: [char; 6] = ['+', '-', '*', '/', '(', ')'];

/// Tracks whether a character stream is inside a double-quoted string.
#[derive(Debug, Default, Clone, Copy)]
struct QuoteTracker {
    in_string: bool,
    escaped: bool,
}

impl QuoteTracker {
    /// Feed one character. Returns `true` if it belongs to a string literal,
    /// including the quotes themselves.
    fn step(&mut self, c: char) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if c == '\\' {
                self.escaped = true;
            } else if c == '"' {
                self.in_string = false;
            }
            true
        } else if c == '"' {
            self.in_string = true;
            true
        } else {
            false
        }
    }
}

/// How the arguments of a statement were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementForm {
    /// `Foo`
    Bare,
    /// `Foo(1, 2)`
    Parenthesized,
    /// `Foo 1, 2`
    SpaceSeparated,
}

/// A statement split into function name and raw argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedStatement<'a> {
    /// The function (command) name.
    pub function: &'a str,
    /// Argument text, without the enclosing parentheses.
    pub arguments: &'a str,
    /// Which syntax the arguments used.
    pub form: StatementForm,
}

/// Split a statement into function name and argument text.
///
/// The name ends at the first `(` or space. After a `(` the rest of the
/// statement minus one trailing `)` is the argument text; after a space the
/// rest is taken as is. Parentheses are not balance-checked here.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{parse_statement, StatementForm};
///
/// let stmt = parse_statement("  Foo(1, Bar(2))  ");
/// assert_eq!(stmt.function, "Foo");
/// assert_eq!(stmt.arguments, "1, Bar(2)");
/// assert_eq!(stmt.form, StatementForm::Parenthesized);
///
/// let stmt = parse_statement("Foo 1,2");
/// assert_eq!(stmt.arguments, "1,2");
/// assert_eq!(stmt.form, StatementForm::SpaceSeparated);
/// ```
pub fn parse_statement(text: &str) -> ParsedStatement<'_> {
    let trimmed = text.trim_matches([' ', '\t']);

    match trimmed.find(['(', ' ']) {
        Some(i) if trimmed[i..].starts_with('(') => {
            let inner = &trimmed[i + 1..];
            ParsedStatement {
                function: &trimmed[..i],
                arguments: inner.strip_suffix(')').unwrap_or(inner),
                form: StatementForm::Parenthesized,
            }
        }
        Some(i) => ParsedStatement {
            function: &trimmed[..i],
            arguments: &trimmed[i + 1..],
            form: StatementForm::SpaceSeparated,
        },
        None => ParsedStatement {
            function: trimmed,
            arguments: "",
            form: StatementForm::Bare,
        },
    }
}

/// Whether argument text begins with a function call such as `Bar(`.
pub fn starts_with_call(arguments: &str) -> bool {
    let text = arguments.trim_start();
    let mut chars = text.char_indices();

    match chars.next() {
        Some((_, c)) if c.is_alphabetic() => {}
        _ => return false,
    }

    let end = chars
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    text[end..].trim_start().starts_with('(')
}

/// Split argument text on top-level commas.
///
/// Commas inside string literals or nested parentheses do not split. The
/// commas themselves are dropped.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::split_arguments;
///
/// assert_eq!(split_arguments(r#"a,"b,c",d"#), vec!["a", r#""b,c""#, "d"]);
/// assert_eq!(split_arguments("Max(1,2),3"), vec!["Max(1,2)", "3"]);
/// ```
pub fn split_arguments(arguments: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    if arguments.is_empty() {
        return pieces;
    }

    let mut tracker = QuoteTracker::default();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in arguments.char_indices() {
        if tracker.step(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(&arguments[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    pieces.push(&arguments[start..]);
    pieces
}

/// Split raw argument text on top-level commas not preceded by a backslash.
///
/// Used for commands that take their arguments as plain strings. Commas
/// inside string literals or nested parentheses do not split. Outside
/// strings `\,` is unescaped to `,`. Each piece is trimmed.
///
/// ```
/// use bevy_console_lang::core::split_escaped_commas;
///
/// assert_eq!(split_escaped_commas(r"a(b,c), d\,e"), vec!["a(b,c)", "d,e"]);
/// ```
pub fn split_escaped_commas(arguments: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    if arguments.trim().is_empty() {
        return pieces;
    }

    let mut tracker = QuoteTracker::default();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut chars = arguments.chars().peekable();

    while let Some(c) = chars.next() {
        if tracker.step(c) {
            current.push(c);
            continue;
        }
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => pieces.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }

    pieces.push(current.trim().to_string());
    pieces
}

/// Remove all whitespace outside string literals.
///
/// ```
/// use bevy_console_lang::core::trim_text;
///
/// assert_eq!(trim_text(r#"  1 + 2, "a b"  "#), r#"1+2,"a b""#);
/// ```
pub fn trim_text(text: &str) -> String {
    let mut tracker = QuoteTracker::default();
    text.trim()
        .chars()
        .filter(|&c| tracker.step(c) || !c.is_whitespace())
        .collect()
}

/// Tokenize an expression into operands and single-character operators.
///
/// Splits on `+ - * / ( )` outside string literals; each delimiter becomes its
/// own token.
///
/// ```
/// use bevy_console_lang::core::split_expression;
///
/// let tokens: Vec<_> = split_expression("(1+Five())*2").into_iter().collect();
/// assert_eq!(tokens, vec!["(", "1", "+", "Five", "(", ")", ")", "*", "2"]);
/// ```
pub fn split_expression(expr: &str) -> VecDeque<&str> {
    let mut tokens = VecDeque::new();
    let mut tracker = QuoteTracker::default();
    let mut start = 0;

    for (i, c) in expr.char_indices() {
        if tracker.step(c) || !EXPRESSION_DELIMITERS.contains(&c) {
            continue;
        }
        if start < i {
            tokens.push_back(&expr[start..i]);
        }
        tokens.push_back(&expr[i..i + c.len_utf8()]);
        start = i + c.len_utf8();
    }

    if start < expr.len() {
        tokens.push_back(&expr[start..]);
    }

    tokens
}

/// Split input into statements on `;` outside string literals.
///
/// Empty statements are dropped.
///
/// ```
/// use bevy_console_lang::core::split_commands;
///
/// let commands = split_commands(r#"echo "a; b"; Foo(1) ;; Bar"#);
/// assert_eq!(commands, vec![r#"echo "a; b""#, "Foo(1)", "Bar"]);
/// ```
pub fn split_commands(input: &str) -> Vec<&str> {
    let mut commands = Vec::new();
    let mut tracker = QuoteTracker::default();
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if !tracker.step(c) && c == ';' {
            let cmd = input[start..i].trim();
            if !cmd.is_empty() {
                commands.push(cmd);
            }
            start = i + 1;
        }
    }

    let cmd = input[start..].trim();
    if !cmd.is_empty() {
        commands.push(cmd);
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare() {
        let stmt = parse_statement("Foo");
        assert_eq!(stmt.function, "Foo");
        assert_eq!(stmt.arguments, "");
        assert_eq!(stmt.form, StatementForm::Bare);
    }

    #[test]
    fn test_parse_empty_parens() {
        let stmt = parse_statement("Foo()");
        assert_eq!(stmt.function, "Foo");
        assert_eq!(stmt.arguments, "");
        assert_eq!(stmt.form, StatementForm::Parenthesized);
    }

    #[test]
    fn test_parse_nested_parens() {
        let stmt = parse_statement(r#"Foo(Bar(1,2), Baz("x"))"#);
        assert_eq!(stmt.function, "Foo");
        assert_eq!(stmt.arguments, r#"Bar(1,2), Baz("x")"#);
    }

    #[test]
    fn test_parse_trims_tabs() {
        let stmt = parse_statement("\t Foo 1, 2 \t");
        assert_eq!(stmt.function, "Foo");
        assert_eq!(stmt.arguments, "1, 2");
    }

    #[test]
    fn test_parse_unclosed_paren() {
        let stmt = parse_statement("Foo(1,2");
        assert_eq!(stmt.arguments, "1,2");
    }

    #[test]
    fn test_starts_with_call() {
        assert!(starts_with_call("Bar()"));
        assert!(starts_with_call(" Bar_2 (1), 3"));
        assert!(!starts_with_call("1, Bar()"));
        assert!(!starts_with_call("Bar"));
        assert!(!starts_with_call(r#""Bar()""#));
        assert!(!starts_with_call(""));
    }

    #[test]
    fn test_split_arguments_quoted_comma() {
        let args = split_arguments(r#"a,"b,c",d"#);
        assert_eq!(args.len(), 3);
        assert_eq!(args, vec!["a", "\"b,c\"", "d"]);
    }

    #[test]
    fn test_split_arguments_escaped_quote() {
        let args = split_arguments(r#""a\",b",c"#);
        assert_eq!(args, vec![r#""a\",b""#, "c"]);
    }

    #[test]
    fn test_split_arguments_nested() {
        let args = split_arguments("Foo(Bar(1,2),3),(4,5)");
        assert_eq!(args, vec!["Foo(Bar(1,2),3)", "(4,5)"]);
    }

    #[test]
    fn test_split_arguments_empty() {
        assert!(split_arguments("").is_empty());
        assert_eq!(split_arguments("a,"), vec!["a", ""]);
    }

    #[test]
    fn test_split_escaped_commas() {
        assert_eq!(split_escaped_commas(r"a, b\,c ,d"), vec!["a", "b,c", "d"]);
        assert_eq!(split_escaped_commas("single"), vec!["single"]);
        assert!(split_escaped_commas("   ").is_empty());
    }

    #[test]
    fn test_split_escaped_commas_top_level_only() {
        assert_eq!(split_escaped_commas("a(b,c)"), vec!["a(b,c)"]);
        assert_eq!(
            split_escaped_commas(r#"f(g(1,2),3), "x,y", z\,w"#),
            vec!["f(g(1,2),3)", r#""x,y""#, "z,w"]
        );
        assert_eq!(split_escaped_commas(r#""a\",b", c"#), vec![r#""a\",b""#, "c"]);
    }

    #[test]
    fn test_trim_text_preserves_strings() {
        assert_eq!(trim_text(r#" Foo( 1 , " x y " ) "#), r#"Foo(1," x y ")"#);
        assert_eq!(trim_text(r#""a \" b" + c"#), r#""a \" b"+c"#);
    }

    #[test]
    fn test_split_expression() {
        let tokens: Vec<_> = split_expression("1+2*3").into_iter().collect();
        assert_eq!(tokens, vec!["1", "+", "2", "*", "3"]);
    }

    #[test]
    fn test_split_expression_leading_operator() {
        let tokens: Vec<_> = split_expression("-5").into_iter().collect();
        assert_eq!(tokens, vec!["-", "5"]);
    }

    #[test]
    fn test_split_expression_single_token() {
        let tokens: Vec<_> = split_expression("42").into_iter().collect();
        assert_eq!(tokens, vec!["42"]);
        assert!(split_expression("").is_empty());
    }

    #[test]
    fn test_split_expression_respects_strings() {
        let tokens: Vec<_> = split_expression(r#""a+b"+"(c)""#).into_iter().collect();
        assert_eq!(tokens, vec![r#""a+b""#, "+", r#""(c)""#]);
    }

    #[test]
    fn test_split_commands() {
        assert_eq!(split_commands("a; b;c"), vec!["a", "b", "c"]);
        assert!(split_commands(";;;").is_empty());
        assert!(split_commands("").is_empty());
    }

    #[test]
    fn test_split_commands_escaped_quote() {
        let commands = split_commands(r#"echo "x\";y"; z"#);
        assert_eq!(commands, vec![r#"echo "x\";y""#, "z"]);
    }
}
