//! Dynamically typed console values.
//!
//! An [`Argument`] keeps its value in canonical text form together with a
//! type tag and the expression it came from. Arithmetic resolves a common
//! type first and then computes with checked native arithmetic of that width.

use std::fmt::{self, Display};
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use super::{ConsoleError, ConsoleResult};

/// Origin given to arguments produced from an invalid-argument error.
pub const INVALID_ARGUMENT_ORIGIN: &str = "invalid_argument exception";

/// Origin given to arguments produced from any other error.
pub const RUNTIME_ERROR_ORIGIN: &str = "runtime_error exception";

/// Type tag of an [`Argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArgumentType {
    /// No value (empty expression, commands without a result).
    #[default]
    None,
    Bool,
    Int32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    Unknown,
}

impl ArgumentType {
    /// Get the display name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            ArgumentType::None => "none",
            ArgumentType::Bool => "bool",
            ArgumentType::Int32 => "int32",
            ArgumentType::Int64 => "int64",
            ArgumentType::UInt64 => "uint64",
            ArgumentType::Float => "float",
            ArgumentType::Double => "double",
            ArgumentType::String => "string",
            ArgumentType::Unknown => "unknown",
        }
    }

    /// Float or double.
    #[inline]
    pub fn is_floating(&self) -> bool {
        matches!(self, ArgumentType::Float | ArgumentType::Double)
    }

    /// Any of the integer widths.
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(self, ArgumentType::Int32 | ArgumentType::Int64 | ArgumentType::UInt64)
    }

    // bool < int32 < int64 < uint64
    fn integer_rank(&self) -> u8 {
        match self {
            ArgumentType::Int32 => 1,
            ArgumentType::Int64 => 2,
            ArgumentType::UInt64 => 3,
            _ => 0,
        }
    }
}

impl Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary arithmetic operator of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// Parse an operator character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }

    /// Parse a single-character operator token.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// The operator character.
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Binding tier: `+ -` bind looser than `* /`.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div => 2,
        }
    }

    /// Whether a pending `top` operator has to be applied before `self` is pushed.
    ///
    /// True for equal tiers (left-to-right evaluation) and when `top` binds tighter.
    #[inline]
    pub fn executes_after(&self, top: Operator) -> bool {
        self.precedence() <= top.precedence()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A typed console value stored in canonical text form.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{Argument, ArgumentType, Operator};
///
/// let lhs = Argument::from(2i32);
/// let rhs = Argument::from(1.5f32);
///
/// let sum = Argument::combine(Operator::Add, &lhs, &rhs).unwrap();
/// assert_eq!(sum.ty(), ArgumentType::Float);
/// assert_eq!(sum.value(), "3.5");
/// assert_eq!(sum.origin(), "2 + 1.5");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Argument {
    ty: ArgumentType,
    value: String,
    origin: String,
}

impl Argument {
    pub(crate) fn typed(ty: ArgumentType, value: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            ty,
            value: value.into(),
            origin: origin.into(),
        }
    }

    /// An argument without a value.
    pub fn none() -> Self {
        Self::default()
    }

    /// A string argument.
    pub fn string(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::typed(ArgumentType::String, value.clone(), value)
    }

    /// Convert an error into a printable string argument.
    ///
    /// The origin records the error class so callers can tell results and
    /// failures apart after the fact.
    pub fn from_error(err: &ConsoleError) -> Self {
        let origin = if err.is_invalid_argument() {
            INVALID_ARGUMENT_ORIGIN
        } else {
            RUNTIME_ERROR_ORIGIN
        };
        Self::typed(ArgumentType::String, err.to_string(), origin)
    }

    /// Replace the origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// The type tag.
    #[inline]
    pub fn ty(&self) -> ArgumentType {
        self.ty
    }

    /// The canonical text form.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the value came from.
    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether this argument has no value.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.ty == ArgumentType::None
    }

    /// Whether this argument was produced by [`Argument::from_error`].
    pub fn is_error(&self) -> bool {
        self.ty == ArgumentType::String
            && (self.origin == INVALID_ARGUMENT_ORIGIN || self.origin == RUNTIME_ERROR_ORIGIN)
    }

    /// Parse a numeric literal.
    ///
    /// A trailing `f` makes a float, a single `.` a double; anything else must
    /// be an integer and takes the narrowest of int32, int64 and uint64 that
    /// holds it.
    pub fn parse_number(text: &str) -> ConsoleResult {
        let invalid = || ConsoleError::InvalidNumber(text.to_string());
        let numeric_chars = |s: &str| {
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
        };

        if let Some(body) = text.strip_suffix('f') {
            if !numeric_chars(body) {
                return Err(invalid());
            }
            let value: f32 = body.parse().map_err(|_| invalid())?;
            return Ok(Self::typed(ArgumentType::Float, value.to_string(), text));
        }

        match text.matches('.').count() {
            0 => {}
            1 => {
                if !numeric_chars(text) {
                    return Err(invalid());
                }
                let value: f64 = text.parse().map_err(|_| invalid())?;
                return Ok(Self::typed(ArgumentType::Double, value.to_string(), text));
            }
            _ => return Err(invalid()),
        }

        if !numeric_chars(text) {
            return Err(invalid());
        }

        if let Ok(value) = text.parse::<i32>() {
            Ok(Self::typed(ArgumentType::Int32, value.to_string(), text))
        } else if let Ok(value) = text.parse::<i64>() {
            Ok(Self::typed(ArgumentType::Int64, value.to_string(), text))
        } else if let Ok(value) = text.parse::<u64>() {
            Ok(Self::typed(ArgumentType::UInt64, value.to_string(), text))
        } else {
            Err(invalid())
        }
    }

    /// Recognize the boolean keywords `true`, `TRUE`, `false` and `FALSE`.
    pub fn parse_bool_keyword(text: &str) -> Option<Self> {
        match text {
            "true" | "TRUE" => Some(Self::typed(ArgumentType::Bool, "true", text)),
            "false" | "FALSE" => Some(Self::typed(ArgumentType::Bool, "false", text)),
            _ => None,
        }
    }

    // Text fed to numeric parsers: bools count as 1/0, an empty value as 0.
    fn numeric_text(&self) -> &str {
        match self.ty {
            ArgumentType::Bool => {
                if self.value == "true" {
                    "1"
                } else {
                    "0"
                }
            }
            ArgumentType::None => "0",
            _ => &self.value,
        }
    }

    /// Parse the value as a native type.
    pub fn parse<T: FromStr>(&self) -> ConsoleResult<T> {
        self.numeric_text()
            .parse()
            .map_err(|_| ConsoleError::InvalidNumber(self.value.clone()))
    }

    /// Interpret as a boolean. Numbers are true when non-zero.
    pub fn as_bool(&self) -> ConsoleResult<bool> {
        match self.ty {
            ArgumentType::Bool => Ok(self.value == "true"),
            ArgumentType::String => match self.value.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConsoleError::InvalidArgument(format!(
                    "'{}' is not a boolean",
                    self.value
                ))),
            },
            _ => Ok(self.parse::<f64>()? != 0.0),
        }
    }

    /// Interpret as an `i32`.
    pub fn as_i32(&self) -> ConsoleResult<i32> {
        self.parse()
    }

    /// Interpret as an `i64`.
    pub fn as_i64(&self) -> ConsoleResult<i64> {
        self.parse()
    }

    /// Interpret as a `u64`.
    pub fn as_u64(&self) -> ConsoleResult<u64> {
        self.parse()
    }

    /// Interpret as an `f32`.
    pub fn as_f32(&self) -> ConsoleResult<f32> {
        self.parse()
    }

    /// Interpret as an `f64`.
    pub fn as_f64(&self) -> ConsoleResult<f64> {
        self.parse()
    }

    /// The value as text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Resolve the type both operands are computed in.
    ///
    /// The left operand wins unless it is `None`. Floating types dominate
    /// integers, integers widen toward uint64 and strings only combine with `+`.
    pub fn resolve_type(op: Operator, lhs: ArgumentType, rhs: ArgumentType) -> ConsoleResult<ArgumentType> {
        use ArgumentType::*;

        match (lhs, rhs) {
            (None, r) => Ok(r),
            (l, None) => Ok(l),
            (Unknown, _) | (_, Unknown) => Err(ConsoleError::UnsupportedOperation {
                op: op.symbol(),
                ty: Unknown,
            }),
            (String, _) | (_, String) => {
                if op == Operator::Add {
                    Ok(String)
                } else {
                    Err(ConsoleError::UnsupportedOperation { op: op.symbol(), ty: String })
                }
            }
            (l, _) if l.is_floating() => Ok(l),
            (_, r) if r.is_floating() => Ok(r),
            (l, r) => Ok(if l.integer_rank() >= r.integer_rank() { l } else { r }),
        }
    }

    /// Apply `op` to two arguments after resolving their common type.
    pub fn combine(op: Operator, lhs: &Argument, rhs: &Argument) -> ConsoleResult {
        let ty = Self::resolve_type(op, lhs.ty, rhs.ty)?;
        let origin = format!("{} {} {}", lhs.origin, op, rhs.origin);

        let value = match ty {
            ArgumentType::None => String::new(),
            ArgumentType::Bool => {
                let result = float_op(op, lhs.parse::<f64>()?, rhs.parse::<f64>()?);
                (result > 0.0).to_string()
            }
            ArgumentType::Int32 => checked_i32(op, lhs.parse()?, rhs.parse()?, &origin)?.to_string(),
            ArgumentType::Int64 => checked_i64(op, lhs.parse()?, rhs.parse()?, &origin)?.to_string(),
            ArgumentType::UInt64 => checked_u64(op, lhs.parse()?, rhs.parse()?, &origin)?.to_string(),
            ArgumentType::Float => float_op(op, lhs.parse::<f32>()?, rhs.parse::<f32>()?).to_string(),
            ArgumentType::Double => float_op(op, lhs.parse::<f64>()?, rhs.parse::<f64>()?).to_string(),
            ArgumentType::String => format!("{}{}", lhs.value, rhs.value),
            ArgumentType::Unknown => {
                return Err(ConsoleError::UnsupportedOperation { op: op.symbol(), ty });
            }
        };

        Ok(Self::typed(ty, value, origin))
    }
}

fn float_op<T>(op: Operator, a: T, b: T) -> T
where
    T: Add<Output = T> + Sub<Output = T> + Mul<Output = T> + Div<Output = T>,
{
    match op {
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div => a / b,
    }
}

macro_rules! checked_integer_op {
    ($name:ident, $t:ty) => {
        fn $name(op: Operator, a: $t, b: $t, expr: &str) -> ConsoleResult<$t> {
            let result = match op {
                Operator::Add => a.checked_add(b),
                Operator::Sub => a.checked_sub(b),
                Operator::Mul => a.checked_mul(b),
                Operator::Div => {
                    if b == 0 {
                        return Err(ConsoleError::DivisionByZero(expr.to_string()));
                    }
                    a.checked_div(b)
                }
            };
            result.ok_or_else(|| ConsoleError::Overflow(expr.to_string()))
        }
    };
}

checked_integer_op!(checked_i32, i32);
checked_integer_op!(checked_i64, i64);
checked_integer_op!(checked_u64, u64);

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

macro_rules! argument_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for Argument {
            fn from(value: $t) -> Self {
                let text = value.to_string();
                Self::typed(ArgumentType::$variant, text.clone(), text)
            }
        }
    };
}

argument_from!(bool, Bool);
argument_from!(i32, Int32);
argument_from!(i64, Int64);
argument_from!(u64, UInt64);
argument_from!(f32, Float);
argument_from!(f64, Double);

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Argument {
        Argument::parse_number(text).unwrap()
    }

    #[test]
    fn test_promotion_int_float() {
        let result = Argument::combine(Operator::Add, &num("2"), &num("1.5f")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Float);
        assert_eq!(result.value(), "3.5");
        assert_eq!(result.origin(), "2 + 1.5f");
    }

    #[test]
    fn test_left_floating_type_wins() {
        let result = Argument::combine(Operator::Mul, &num("2f"), &num("0.5")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Float);

        let result = Argument::combine(Operator::Mul, &num("0.5"), &num("2f")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Double);
        assert_eq!(result.value(), "1");
    }

    #[test]
    fn test_integer_widening() {
        let result = Argument::combine(Operator::Add, &num("1"), &num("5000000000")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Int64);
        assert_eq!(result.value(), "5000000001");

        let result = Argument::combine(Operator::Add, &num("1"), &num("10000000000000000000")).unwrap();
        assert_eq!(result.ty(), ArgumentType::UInt64);
        assert_eq!(result.value(), "10000000000000000001");
    }

    #[test]
    fn test_none_adopts_other_type() {
        let result = Argument::combine(Operator::Add, &Argument::none(), &num("4")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Int32);
        assert_eq!(result.value(), "4");
    }

    #[test]
    fn test_bool_positive_rule() {
        let t = Argument::from(true);
        let f = Argument::from(false);

        let result = Argument::combine(Operator::Add, &t, &f).unwrap();
        assert_eq!(result.ty(), ArgumentType::Bool);
        assert_eq!(result.value(), "true");

        let result = Argument::combine(Operator::Sub, &f, &t).unwrap();
        assert_eq!(result.value(), "false");

        let result = Argument::combine(Operator::Add, &t, &num("2")).unwrap();
        assert_eq!(result.ty(), ArgumentType::Int32);
        assert_eq!(result.value(), "3");
    }

    #[test]
    fn test_string_concatenation() {
        let result = Argument::combine(Operator::Add, &Argument::from("ab"), &Argument::from("cd")).unwrap();
        assert_eq!(result.ty(), ArgumentType::String);
        assert_eq!(result.value(), "abcd");

        let result = Argument::combine(Operator::Add, &Argument::from("n="), &num("3")).unwrap();
        assert_eq!(result.value(), "n=3");
    }

    #[test]
    fn test_string_rejects_other_operators() {
        let err = Argument::combine(Operator::Sub, &Argument::from("ab"), &num("1")).unwrap_err();
        assert_eq!(
            err,
            ConsoleError::UnsupportedOperation { op: '-', ty: ArgumentType::String }
        );
    }

    #[test]
    fn test_integer_division_by_zero() {
        let err = Argument::combine(Operator::Div, &num("1"), &num("0")).unwrap_err();
        assert!(matches!(err, ConsoleError::DivisionByZero(_)));

        // Floating point follows IEEE semantics.
        let result = Argument::combine(Operator::Div, &num("1.0"), &num("0")).unwrap();
        assert_eq!(result.value(), "inf");
    }

    #[test]
    fn test_integer_overflow() {
        let err = Argument::combine(Operator::Mul, &num("2147483647"), &num("2")).unwrap_err();
        assert!(matches!(err, ConsoleError::Overflow(_)));
    }

    #[test]
    fn test_integer_division_truncates() {
        let result = Argument::combine(Operator::Div, &num("7"), &num("2")).unwrap();
        assert_eq!(result.value(), "3");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(num("42").ty(), ArgumentType::Int32);
        assert_eq!(num("-42").value(), "-42");
        assert_eq!(num("+7").value(), "7");
        assert_eq!(num("3000000000").ty(), ArgumentType::Int64);
        assert_eq!(num("18446744073709551615").ty(), ArgumentType::UInt64);
        assert_eq!(num("1.25").ty(), ArgumentType::Double);
        assert_eq!(num("2f").ty(), ArgumentType::Float);
        assert_eq!(num("2.5f").value(), "2.5");
    }

    #[test]
    fn test_parse_number_errors() {
        for text in ["1.2.3", "12a", "", "-", "99999999999999999999999", "x1f", "1.5.f"] {
            assert!(
                matches!(Argument::parse_number(text), Err(ConsoleError::InvalidNumber(_))),
                "expected '{}' to be rejected",
                text
            );
        }
    }

    #[test]
    fn test_bool_keywords() {
        assert_eq!(Argument::parse_bool_keyword("true").unwrap().value(), "true");
        assert_eq!(Argument::parse_bool_keyword("FALSE").unwrap().value(), "false");
        assert!(Argument::parse_bool_keyword("True").is_none());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(num("12").as_i32().unwrap(), 12);
        assert_eq!(num("12").as_f64().unwrap(), 12.0);
        assert!(Argument::from(true).as_bool().unwrap());
        assert!(!num("0").as_bool().unwrap());
        assert_eq!(Argument::from(true).as_i32().unwrap(), 1);
        assert!(Argument::from("abc").as_i32().is_err());
    }

    #[test]
    fn test_error_arguments() {
        let arg = Argument::from_error(&ConsoleError::UnknownCommand("Foo".into()));
        assert!(arg.is_error());
        assert_eq!(arg.origin(), INVALID_ARGUMENT_ORIGIN);

        let arg = Argument::from_error(&ConsoleError::DivisionByZero("1 / 0".into()));
        assert_eq!(arg.origin(), RUNTIME_ERROR_ORIGIN);

        assert!(!Argument::from("plain").is_error());
    }

    #[test]
    fn test_operator_precedence() {
        assert!(Operator::Add.executes_after(Operator::Sub));
        assert!(Operator::Add.executes_after(Operator::Mul));
        assert!(!Operator::Mul.executes_after(Operator::Add));
        assert!(Operator::Div.executes_after(Operator::Mul));
    }
}
