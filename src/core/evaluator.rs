//! Statement and expression evaluation.
//!
//! A statement is a call `Name(args)`, `Name args` or `Name`. Each argument is
//! an expression over literals, nested calls and `+ - * /` with the usual
//! precedence, computed with an operand stack and an operator stack.

use std::collections::VecDeque;

use bevy::log::debug;

use super::{
    parse_statement, split_arguments, split_escaped_commas, split_expression, starts_with_call,
    trim_text, Argument, ArgumentType, Command, CommandContext, ConsoleError, ConsoleResult,
    ForceStringArguments, Operator, ParsedStatement, StatementForm,
};

/// An entry of the operand stack.
///
/// Literal tokens are evaluated lazily, when an operator consumes them.
#[derive(Debug)]
enum Operand {
    Text(String),
    Value(Argument),
}

impl<'r> CommandContext<'r> {
    /// Execute a statement, converting any failure into an error argument.
    ///
    /// The returned argument is flagged by [`Argument::is_error`] when the
    /// statement failed.
    pub fn execute(&mut self, statement: &str) -> Argument {
        match self.try_execute(statement) {
            Ok(value) => value,
            Err(err) => {
                debug!("Console: '{}' failed: {}", statement, err);
                Argument::from_error(&err)
            }
        }
    }

    /// Execute a statement.
    ///
    /// Handlers may call this on their own context. The nested statement
    /// counts toward the same depth limit as the call that runs it.
    pub fn try_execute(&mut self, statement: &str) -> ConsoleResult {
        self.execute_argument_function(statement)
    }

    /// Look up the called command, build its arguments and run it.
    pub fn execute_argument_function(&mut self, text: &str) -> ConsoleResult {
        let stmt = parse_statement(text);
        let registry = self.registry;
        let command = registry
            .get(stmt.function)
            .ok_or_else(|| ConsoleError::UnknownCommand(stmt.function.to_string()))?;

        self.nested(|ctx| {
            let args = ctx.build_arguments(command, &stmt)?;
            command.execute(ctx, &args)
        })
    }

    fn build_arguments(&mut self, command: &Command, stmt: &ParsedStatement<'_>) -> ConsoleResult<Vec<Argument>> {
        match command.get_force_string_arguments() {
            ForceStringArguments::All => {
                if stmt.arguments.trim().is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![Argument::string(stmt.arguments)])
                }
            }
            ForceStringArguments::PerArgument => Ok(split_escaped_commas(stmt.arguments)
                .into_iter()
                .map(Argument::string)
                .collect()),
            ForceStringArguments::None => {
                if stmt.form == StatementForm::SpaceSeparated && starts_with_call(stmt.arguments) {
                    return Err(ConsoleError::InvalidArgument(format!(
                        "'{} {}': a call cannot start space separated arguments, use {}({})",
                        stmt.function, stmt.arguments, stmt.function, stmt.arguments
                    )));
                }
                let trimmed = trim_text(stmt.arguments);
                split_arguments(&trimmed)
                    .into_iter()
                    .map(|arg| self.evaluate_expression(arg))
                    .collect()
            }
        }
    }

    /// Evaluate one argument expression.
    ///
    /// A string literal must close at the end of the expression unless an
    /// operator follows it.
    pub fn evaluate_expression(&mut self, expr: &str) -> ConsoleResult {
        let expr = expr.trim();
        if expr.is_empty() {
            return Ok(Argument::none());
        }
        if !expr.starts_with('"') {
            return self.parse_expression(expr);
        }

        match closing_quote(expr) {
            None => Err(ConsoleError::UnterminatedString(expr.to_string())),
            Some(end) if end + 1 == expr.len() => Ok(Argument::typed(
                ArgumentType::String,
                expr[1..end].replace("\\\"", "\""),
                expr,
            )),
            Some(end) => {
                if expr[end + 1..].trim_start().starts_with(['+', '-', '*', '/']) {
                    self.parse_expression(expr)
                } else {
                    Err(ConsoleError::UnexpectedQuote(expr.to_string()))
                }
            }
        }
    }

    /// Evaluate an expression that is not a lone string literal.
    ///
    /// Single tokens are boolean keywords, zero-argument calls or numbers;
    /// anything longer goes through [`calculate_expression`](Self::calculate_expression).
    pub fn parse_expression(&mut self, expr: &str) -> ConsoleResult {
        let mut tokens = split_expression(expr);
        if tokens.len() > 1 {
            return self.calculate_expression(&mut tokens);
        }

        match expr.chars().next() {
            None => Ok(Argument::none()),
            Some('"') => self.evaluate_expression(expr),
            Some(c) if c.is_alphabetic() => match Argument::parse_bool_keyword(expr) {
                Some(value) => Ok(value),
                None => self.execute_argument_function(expr),
            },
            Some(_) => Argument::parse_number(expr),
        }
    }

    /// Evaluate a token stream with `+ - * /` precedence and parentheses.
    ///
    /// Operators of equal precedence run left to right. A missing operand is
    /// taken as int32 zero, so a leading `-` negates.
    pub fn calculate_expression(&mut self, tokens: &mut VecDeque<&str>) -> ConsoleResult {
        let source: String = tokens.iter().copied().collect();
        self.calculate_group(tokens, false, &source)
    }

    fn calculate_group(&mut self, tokens: &mut VecDeque<&str>, in_parens: bool, source: &str) -> ConsoleResult {
        let mut operands: Vec<Operand> = Vec::new();
        let mut operators: Vec<Operator> = Vec::new();

        while let Some(token) = tokens.pop_front() {
            if let Some(op) = Operator::from_token(token) {
                while let Some(&top) = operators.last() {
                    if !op.executes_after(top) {
                        break;
                    }
                    self.execute_single_calculation(&mut operands, &mut operators)?;
                }
                operators.push(op);
                continue;
            }

            match token {
                "(" => {
                    let value = self.nested(|ctx| ctx.calculate_group(tokens, true, source))?;
                    operands.push(Operand::Value(value));
                }
                ")" => {
                    if !in_parens {
                        return Err(ConsoleError::UnbalancedParentheses(source.to_string()));
                    }
                    return self.finish_group(operands, operators);
                }
                _ if is_call_name(token) => {
                    let call = if tokens.front() == Some(&"(") {
                        take_call(token, tokens)?
                    } else {
                        format!("{}()", token)
                    };
                    let value = self.execute_argument_function(&call)?;
                    operands.push(Operand::Value(value));
                }
                _ => operands.push(Operand::Text(token.to_string())),
            }
        }

        if in_parens {
            return Err(ConsoleError::UnbalancedParentheses(source.to_string()));
        }
        self.finish_group(operands, operators)
    }

    fn finish_group(&mut self, mut operands: Vec<Operand>, mut operators: Vec<Operator>) -> ConsoleResult {
        while !operators.is_empty() {
            self.execute_single_calculation(&mut operands, &mut operators)?;
        }

        match operands.len() {
            0 => Ok(Argument::none()),
            1 => match operands.pop() {
                Some(operand) => self.resolve_operand(operand),
                None => Ok(Argument::none()),
            },
            _ => Err(ConsoleError::InvalidArgument(
                "missing operator between operands".to_string(),
            )),
        }
    }

    /// Pop one operator and its operands and push the result.
    ///
    /// Missing operands default to int32 zero.
    fn execute_single_calculation(&mut self, operands: &mut Vec<Operand>, operators: &mut Vec<Operator>) -> ConsoleResult<()> {
        let Some(op) = operators.pop() else {
            return Ok(());
        };

        let rhs = operands.pop();
        let lhs = operands.pop();
        let lhs = match lhs {
            Some(operand) => self.resolve_operand(operand)?,
            None => Argument::from(0i32),
        };
        let rhs = match rhs {
            Some(operand) => self.resolve_operand(operand)?,
            None => Argument::from(0i32),
        };

        let result = Argument::combine(op, &lhs, &rhs)?;
        operands.push(Operand::Value(result));
        Ok(())
    }

    fn resolve_operand(&mut self, operand: Operand) -> ConsoleResult {
        match operand {
            Operand::Value(value) => Ok(value),
            Operand::Text(text) => self.evaluate_expression(&text),
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ConsoleResult<T>) -> ConsoleResult<T> {
        if self.depth >= self.max_depth {
            return Err(ConsoleError::ExpressionTooDeep { limit: self.max_depth });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

fn is_call_name(token: &str) -> bool {
    token.starts_with(char::is_alphabetic) && Argument::parse_bool_keyword(token).is_none()
}

/// Reassemble `name(...)` from the token stream, consuming through the matching `)`.
fn take_call(name: &str, tokens: &mut VecDeque<&str>) -> ConsoleResult<String> {
    let mut call = String::from(name);
    let mut depth = 0usize;

    while let Some(token) = tokens.pop_front() {
        call.push_str(token);
        match token {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return Ok(call);
                }
            }
            _ => {}
        }
    }

    Err(ConsoleError::UnbalancedParentheses(call))
}

/// Byte index of the quote closing the literal that opens `expr`.
fn closing_quote(expr: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in expr.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::core::{ConVar, ConsoleRegistry};

    fn registry() -> ConsoleRegistry {
        let mut registry = ConsoleRegistry::new();
        registry
            .add_command(Command::new("Five", |_ctx, _args| Ok(Argument::from(5i32))))
            .unwrap();
        registry
            .add_command(Command::new("Max", |_ctx, args| {
                let mut best: Option<f64> = None;
                for arg in args {
                    let v = arg.as_f64()?;
                    best = Some(best.map_or(v, |b| b.max(v)));
                }
                Ok(best.map(Argument::from).unwrap_or_default())
            }))
            .unwrap();
        registry
            .add_command(Command::new("Count", |_ctx, args| Ok(Argument::from(args.len() as i32))))
            .unwrap();
        registry
            .add_command(Command::new("Type", |_ctx, args| {
                Ok(Argument::from(args.first().map(|a| a.ty().name()).unwrap_or("none")))
            }))
            .unwrap();
        registry
            .add_command(
                Command::new("Echo", |_ctx, args| {
                    let texts: Vec<&str> = args.iter().map(Argument::as_str).collect();
                    Ok(Argument::from(texts.join("|")))
                })
                .force_string_arguments(ForceStringArguments::PerArgument),
            )
            .unwrap();
        registry
            .add_command(
                Command::new("Raw", |_ctx, args| Ok(args.first().cloned().unwrap_or_default()))
                    .force_string_arguments(ForceStringArguments::All),
            )
            .unwrap();
        registry
    }

    fn eval(registry: &ConsoleRegistry, input: &str) -> ConsoleResult {
        registry.context().try_execute(input)
    }

    fn value(registry: &ConsoleRegistry, input: &str) -> String {
        eval(registry, input).unwrap().value().to_string()
    }

    #[test]
    fn test_precedence() {
        let registry = registry();
        assert_eq!(value(&registry, "Type(1+2*3)"), "int32");

        let result = registry.context().evaluate_expression("1+2*3").unwrap();
        assert_eq!(result.value(), "7");
    }

    #[test]
    fn test_parentheses() {
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("(1+2)*3").unwrap().value(), "9");
        assert_eq!(ctx.evaluate_expression("((2))").unwrap().value(), "2");
        assert_eq!(ctx.evaluate_expression("2*(3+(4-1))").unwrap().value(), "12");
    }

    #[test]
    fn test_left_to_right() {
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("1-2-3").unwrap().value(), "-4");
        assert_eq!(ctx.evaluate_expression("8/2/2").unwrap().value(), "2");
    }

    #[test]
    fn test_leading_minus() {
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("-5").unwrap().value(), "-5");
        assert_eq!(ctx.evaluate_expression("3+-5").unwrap().value(), "-2");
    }

    #[test]
    fn test_minus_after_multiplication_pads_with_zero() {
        // The pending `*` only has one operand when `-` arrives, so it
        // computes 0 * 2 and the result is 0 - 3.
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("2*-3").unwrap().value(), "-3");
    }

    #[test]
    fn test_nested_call_in_expression() {
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("1+Five()").unwrap().value(), "6");
        assert_eq!(ctx.evaluate_expression("1+Five").unwrap().value(), "6");
        assert_eq!(ctx.evaluate_expression("Max(1,(2+3))*2").unwrap().value(), "10");
        assert_eq!(value(&registry, "Max(Five(), 2, Max(7, 1))"), "7");
    }

    #[test]
    fn test_statement_forms() {
        let registry = registry();
        assert_eq!(value(&registry, "Five"), "5");
        assert_eq!(value(&registry, "Five()"), "5");
        assert_eq!(value(&registry, "Max 1, 4"), "4");
        assert_eq!(value(&registry, "Count()"), "0");
        assert_eq!(value(&registry, "Count(1, 2, 3)"), "3");
    }

    #[test]
    fn test_space_form_rejects_leading_call() {
        let registry = registry();
        let err = eval(&registry, "Max Five(), 1").unwrap_err();
        assert!(err.is_invalid_argument());

        assert_eq!(value(&registry, "Max 1, Five()"), "5");
    }

    #[test]
    fn test_string_literals() {
        let registry = registry();
        let mut ctx = registry.context();

        let s = ctx.evaluate_expression(r#""hello world""#).unwrap();
        assert_eq!(s.ty(), ArgumentType::String);
        assert_eq!(s.value(), "hello world");

        let s = ctx.evaluate_expression(r#""say \"hi\"""#).unwrap();
        assert_eq!(s.value(), r#"say "hi""#);

        let s = ctx.evaluate_expression(r#""a"+"b""#).unwrap();
        assert_eq!(s.value(), "ab");

        let s = ctx.evaluate_expression(r#""n="+Five()"#).unwrap();
        assert_eq!(s.value(), "n=5");
    }

    #[test]
    fn test_string_literal_errors() {
        let registry = registry();
        let mut ctx = registry.context();

        assert!(matches!(
            ctx.evaluate_expression(r#""open"#),
            Err(ConsoleError::UnterminatedString(_))
        ));
        assert!(matches!(
            ctx.evaluate_expression(r#""a"b""#),
            Err(ConsoleError::UnexpectedQuote(_))
        ));
        assert!(matches!(
            ctx.evaluate_expression(r#""a"-1"#),
            Err(ConsoleError::UnsupportedOperation { op: '-', .. })
        ));
    }

    #[test]
    fn test_bool_keywords() {
        let registry = registry();
        let mut ctx = registry.context();
        assert_eq!(ctx.evaluate_expression("true").unwrap().ty(), ArgumentType::Bool);
        assert_eq!(ctx.evaluate_expression("TRUE+FALSE").unwrap().value(), "true");
        assert_eq!(ctx.evaluate_expression("FALSE-TRUE").unwrap().value(), "false");
        assert_eq!(ctx.evaluate_expression("1+true").unwrap().value(), "2");
    }

    #[test]
    fn test_empty_expression() {
        let registry = registry();
        let mut ctx = registry.context();
        assert!(ctx.evaluate_expression("").unwrap().is_none());
        assert!(ctx.evaluate_expression("   ").unwrap().is_none());
        assert_eq!(value(&registry, "Count(1,)"), "2");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let registry = registry();
        let mut ctx = registry.context();
        for expr in ["(1+2", "1+2)", "Max(1,2"] {
            assert!(
                matches!(ctx.evaluate_expression(expr), Err(ConsoleError::UnbalancedParentheses(_))),
                "expected '{}' to be unbalanced",
                expr
            );
        }
    }

    #[test]
    fn test_missing_operator() {
        let registry = registry();
        let mut ctx = registry.context();
        assert!(ctx.evaluate_expression("(1)(2)").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_unknown_command() {
        let registry = registry();
        let err = eval(&registry, "Nope(1)").unwrap_err();
        assert_eq!(err, ConsoleError::UnknownCommand("Nope".into()));

        let err = eval(&registry, "1+Nope()").unwrap_err();
        assert_eq!(err, ConsoleError::UnknownCommand("1+Nope".into()));

        let err = registry.context().evaluate_expression("1+Nope()").unwrap_err();
        assert_eq!(err, ConsoleError::UnknownCommand("Nope".into()));
    }

    #[test]
    fn test_execute_converts_errors() {
        let registry = registry();
        let mut ctx = registry.context();

        let result = ctx.execute("Max(1/0)");
        assert!(result.is_error());
        assert_eq!(result.origin(), crate::core::RUNTIME_ERROR_ORIGIN);

        let result = ctx.execute("Max(1.2.3)");
        assert!(result.is_error());
        assert_eq!(result.origin(), crate::core::INVALID_ARGUMENT_ORIGIN);
    }

    #[test]
    fn test_force_string_per_argument() {
        let registry = registry();
        assert_eq!(value(&registry, r"Echo(a b, 1+2, c\,d)"), "a b|1+2|c,d");
        assert_eq!(value(&registry, "Echo x"), "x");
        assert_eq!(value(&registry, "Echo()"), "");
        assert_eq!(value(&registry, r#"Echo(Max(1,2), "a,b")"#), r#"Max(1,2)|"a,b""#);
    }

    #[test]
    fn test_force_string_all() {
        let registry = registry();
        assert_eq!(value(&registry, "Raw hello, world"), "hello, world");
        assert_eq!(value(&registry, "Raw(Five() + 1)"), "Five() + 1");
        assert!(eval(&registry, "Raw").unwrap().is_none());
    }

    #[test]
    fn test_depth_limit() {
        let registry = registry();
        let mut ctx = registry.context().with_max_depth(3);

        assert_eq!(ctx.try_execute("Max((1))").unwrap().value(), "1");
        assert_eq!(
            ctx.try_execute("Max((((1))))").unwrap_err(),
            ConsoleError::ExpressionTooDeep { limit: 3 }
        );

        // Depth unwinds between statements.
        assert_eq!(ctx.try_execute("Five").unwrap().value(), "5");
        assert_eq!(ctx.depth, 0);
    }

    #[test]
    fn test_handler_executes_statement() {
        let mut registry = registry();
        registry
            .add_command(Command::new("Outer", |ctx, _args| Ok(ctx.execute("Five"))))
            .unwrap();
        registry
            .add_command(Command::new("Twice", |ctx, args| {
                let inner = ctx.try_execute("Outer")?;
                Ok(Argument::from(inner.as_i32()? * args.len() as i32))
            }))
            .unwrap();

        let mut ctx = registry.context();
        assert_eq!(ctx.try_execute("Outer").unwrap().value(), "5");
        assert_eq!(ctx.try_execute("Twice(1, 2)").unwrap().value(), "10");
        assert_eq!(ctx.depth, 0);
        assert_eq!(ctx.try_execute("Max((1), Outer)").unwrap().value(), "5");
    }

    #[test]
    fn test_self_recursive_handler_hits_depth_limit() {
        let mut registry = registry();
        registry
            .add_command(Command::new("Loop", |ctx, _args| ctx.try_execute("Loop")))
            .unwrap();
        registry
            .add_command(Command::new("LoopQuiet", |ctx, _args| Ok(ctx.execute("LoopQuiet"))))
            .unwrap();

        let mut ctx = registry.context().with_max_depth(4);
        assert_eq!(
            ctx.try_execute("Loop").unwrap_err(),
            ConsoleError::ExpressionTooDeep { limit: 4 }
        );
        assert_eq!(ctx.depth, 0);

        // The innermost failure comes back as an error argument.
        assert!(ctx.try_execute("LoopQuiet").unwrap().is_error());
        assert_eq!(ctx.depth, 0);
        assert_eq!(ctx.try_execute("Five").unwrap().value(), "5");
    }

    #[test]
    fn test_variable_in_expression() {
        let mut registry = registry();
        registry
            .add_command(Command::variable(ConVar::new("speed", 10i32)))
            .unwrap();

        assert_eq!(value(&registry, "Max(speed*2, 1)"), "20");
        assert_eq!(value(&registry, "speed(speed+5)"), "15");
        assert_eq!(value(&registry, "speed"), "15");
    }

    #[test]
    fn test_arguments_evaluated_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = registry();
        registry
            .add_command(Command::new("Tick", move |_ctx, _args| {
                Ok(Argument::from(counter.fetch_add(1, Ordering::SeqCst) as i32))
            }))
            .unwrap();

        assert_eq!(value(&registry, "Max(Tick(), Tick()+Tick())"), "3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
