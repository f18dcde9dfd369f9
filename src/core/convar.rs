//! Console variables bound to shared values.
//!
//! A [`ConVar`] wraps a [`ConVarHandle`] that game code keeps a clone of, so
//! setting the variable from the console is visible to the code reading it.

use std::any::Any;
use std::fmt::{self, Display};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Argument, ArgumentType, ConsoleError, ConsoleResult};

/// Shared storage of a variable's value.
pub type ConVarHandle<T> = Arc<RwLock<T>>;

/// Trait for types that can be stored in a ConVar.
///
/// Implemented for `bool`, `i32`, `i64`, `u64`, `f32`, `f64` and `String`.
pub trait ConVarValue: Clone + PartialEq + Send + Sync + 'static {
    /// The argument type values convert to.
    const TYPE: ArgumentType;

    /// Convert from a console argument.
    fn from_argument(arg: &Argument) -> ConsoleResult<Self>;

    /// Convert into a console argument.
    fn to_argument(&self) -> Argument;

    /// Clamp the value to min/max bounds if applicable.
    fn clamp(self, _min: Option<&Self>, _max: Option<&Self>) -> Self {
        self
    }
}

impl ConVarValue for bool {
    const TYPE: ArgumentType = ArgumentType::Bool;

    fn from_argument(arg: &Argument) -> ConsoleResult<Self> {
        arg.as_bool()
    }

    fn to_argument(&self) -> Argument {
        Argument::from(*self)
    }
}

impl ConVarValue for String {
    const TYPE: ArgumentType = ArgumentType::String;

    fn from_argument(arg: &Argument) -> ConsoleResult<Self> {
        Ok(arg.value().to_string())
    }

    fn to_argument(&self) -> Argument {
        Argument::string(self.clone())
    }
}

macro_rules! numeric_convar_value {
    ($t:ty, $variant:ident) => {
        impl ConVarValue for $t {
            const TYPE: ArgumentType = ArgumentType::$variant;

            fn from_argument(arg: &Argument) -> ConsoleResult<Self> {
                arg.parse()
            }

            fn to_argument(&self) -> Argument {
                Argument::from(*self)
            }

            fn clamp(self, min: Option<&Self>, max: Option<&Self>) -> Self {
                let mut v = self;
                if let Some(&min) = min {
                    if v < min {
                        v = min;
                    }
                }
                if let Some(&max) = max {
                    if v > max {
                        v = max;
                    }
                }
                v
            }
        }
    };
}

numeric_convar_value!(i32, Int32);
numeric_convar_value!(i64, Int64);
numeric_convar_value!(u64, UInt64);
numeric_convar_value!(f32, Float);
numeric_convar_value!(f64, Double);

/// Type-erased access to a ConVar, used by variable commands.
pub trait ConVarDyn: Send + Sync {
    /// The variable name.
    fn name(&self) -> &str;

    /// The type of the stored value.
    fn value_type(&self) -> ArgumentType;

    /// Get the current value.
    fn get_argument(&self) -> Argument;

    /// Set the value from an argument, returning the value actually stored.
    fn set_argument(&self, arg: &Argument) -> ConsoleResult;

    /// Get the default value.
    fn default_argument(&self) -> Argument;

    /// Reset to the default value.
    fn reset(&self);

    /// Check if the current value differs from default.
    fn is_modified(&self) -> bool;

    /// Get as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A console variable bound to a shared value.
///
/// # Examples
///
/// ```
/// use bevy_console_lang::core::{Argument, ConVar, ConVarDyn};
///
/// let fov = ConVar::new("fov", 90i32).min(60).max(120);
/// let handle = fov.handle();
///
/// fov.set_argument(&Argument::from(150i32)).unwrap();
/// assert_eq!(*handle.read().unwrap(), 120);
/// ```
pub struct ConVar<T: ConVarValue> {
    name: Box<str>,
    value: ConVarHandle<T>,
    default: T,
    description: &'static str,
    min: Option<T>,
    max: Option<T>,
    read_only: bool,
}

impl<T: ConVarValue> ConVar<T> {
    /// Create a ConVar owning a fresh handle.
    pub fn new(name: impl Into<Box<str>>, default: T) -> Self {
        Self::bind(name, Arc::new(RwLock::new(default)))
    }

    /// Create a ConVar over an existing handle. Its current value becomes the default.
    pub fn bind(name: impl Into<Box<str>>, handle: ConVarHandle<T>) -> Self {
        let default = handle.read().unwrap_or_else(PoisonError::into_inner).clone();
        Self {
            name: name.into(),
            value: handle,
            default,
            description: "",
            min: None,
            max: None,
            read_only: false,
        }
    }

    /// Set the description.
    pub fn description(mut self, desc: &'static str) -> Self {
        self.description = desc;
        self
    }

    /// Set the minimum value.
    pub fn min(mut self, min: T) -> Self {
        self.min = Some(min);
        self.reclamp();
        self
    }

    /// Set the maximum value.
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self.reclamp();
        self
    }

    /// Reject writes from the console.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn reclamp(&mut self) {
        let mut value = self.write();
        *value = value.clone().clamp(self.min.as_ref(), self.max.as_ref());
    }

    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description.
    #[inline]
    pub fn get_description(&self) -> &'static str {
        self.description
    }

    /// A clone of the shared handle.
    pub fn handle(&self) -> ConVarHandle<T> {
        Arc::clone(&self.value)
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.read().clone()
    }

    /// Set the value, applying constraints.
    ///
    /// Returns `false` if the ConVar is read-only.
    pub fn set(&self, value: T) -> bool {
        if self.read_only {
            return false;
        }
        *self.write() = value.clamp(self.min.as_ref(), self.max.as_ref());
        true
    }

    /// Get the default value.
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Whether writes from the console are rejected.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl<T: ConVarValue> ConVarDyn for ConVar<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn value_type(&self) -> ArgumentType {
        T::TYPE
    }

    fn get_argument(&self) -> Argument {
        self.read().to_argument().with_origin(self.name.as_ref())
    }

    fn set_argument(&self, arg: &Argument) -> ConsoleResult {
        if self.read_only {
            return Err(ConsoleError::execution(format!("'{}' is read-only", self.name)));
        }
        let value = T::from_argument(arg).map_err(|_| {
            ConsoleError::InvalidArgument(format!(
                "'{}' expects a {} value, got '{}'",
                self.name,
                T::TYPE,
                arg.value()
            ))
        })?;
        self.set(value);
        Ok(self.get_argument())
    }

    fn default_argument(&self) -> Argument {
        self.default.to_argument().with_origin(self.name.as_ref())
    }

    fn reset(&self) {
        *self.write() = self.default.clone();
    }

    fn is_modified(&self) -> bool {
        *self.read() != self.default
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: ConVarValue> Display for ConVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" = \"{}\"", self.name, self.read().to_argument())?;
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convar_basic() {
        let cvar = ConVar::new("test", 42i32);
        assert_eq!(cvar.get(), 42);
        assert_eq!(cvar.name(), "test");
        assert_eq!(cvar.value_type(), ArgumentType::Int32);
    }

    #[test]
    fn test_convar_shared_handle() {
        let handle = Arc::new(RwLock::new(1.5f32));
        let cvar = ConVar::bind("scale", Arc::clone(&handle));

        cvar.set_argument(&Argument::parse_number("2.5").unwrap()).unwrap();
        assert_eq!(*handle.read().unwrap(), 2.5);
        assert_eq!(cvar.default_value(), &1.5);
        assert!(cvar.is_modified());
    }

    #[test]
    fn test_convar_clamping() {
        let cvar = ConVar::new("test", 50i32).min(0).max(100);

        assert!(cvar.set(150));
        assert_eq!(cvar.get(), 100);

        assert!(cvar.set(-50));
        assert_eq!(cvar.get(), 0);
    }

    #[test]
    fn test_convar_readonly() {
        let cvar = ConVar::new("test", 42i32).read_only();
        assert!(!cvar.set(100));
        assert!(cvar.set_argument(&Argument::from(1i32)).is_err());
        assert_eq!(cvar.get(), 42);
    }

    #[test]
    fn test_convar_reset() {
        let cvar = ConVar::new("test", 42i32);
        cvar.set(100);
        assert!(cvar.is_modified());

        cvar.reset();
        assert_eq!(cvar.get(), 42);
        assert!(!cvar.is_modified());
    }

    #[test]
    fn test_convar_type_mismatch() {
        let cvar = ConVar::new("count", 3i32);
        let err = cvar.set_argument(&Argument::from("many")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(cvar.get(), 3);
    }

    #[test]
    fn test_convar_bool_from_number() {
        let cvar = ConVar::new("enabled", false);
        let stored = cvar.set_argument(&Argument::from(1i32)).unwrap();
        assert_eq!(stored.value(), "true");
        assert_eq!(stored.origin(), "enabled");
        assert!(cvar.get());
    }

    #[test]
    fn test_convar_string() {
        let cvar = ConVar::new("name", String::from("player"));
        cvar.set_argument(&Argument::from("hero")).unwrap();
        assert_eq!(cvar.get(), "hero");
        assert_eq!(cvar.to_string(), "\"name\" = \"hero\"");
    }

    #[test]
    fn test_convar_downcast() {
        let cvar: Box<dyn ConVarDyn> = Box::new(ConVar::new("test", 42i64));
        let typed = cvar.as_any().downcast_ref::<ConVar<i64>>().unwrap();
        assert_eq!(typed.get(), 42);
    }
}
